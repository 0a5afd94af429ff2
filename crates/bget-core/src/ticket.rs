//! Shareable auth tickets.
//!
//! An auth ticket is a base64-encoded JSON capability granting download
//! access to a file or directory without owning the allocation. Introspection
//! (decoding, filename, lookup hash) is local; cryptographic validation of
//! the signature is the transfer engine's responsibility.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference type marker for a file ticket.
pub const REF_TYPE_FILE: &str = "f";

/// Reference type marker for a directory ticket.
pub const REF_TYPE_DIR: &str = "d";

/// Decoded auth ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTicket {
    /// Allocation the ticket grants access into.
    pub allocation_id: String,
    /// Owner of the allocation (issuer of the ticket).
    pub owner_id: String,
    /// Name of the shared file; empty for directory tickets.
    #[serde(default)]
    pub file_name: String,
    /// Path-derived lookup hash of the shared object.
    #[serde(default)]
    pub file_path_hash: String,
    /// `"f"` for a file, `"d"` for a directory.
    pub reference_type: String,
    /// Unix timestamp after which the ticket is no longer valid.
    #[serde(default)]
    pub expiration: i64,
    /// Owner signature over the ticket body. Verified by the engine.
    #[serde(default)]
    pub signature: String,
}

impl AuthTicket {
    /// Decode a ticket from its shareable base64 form.
    pub fn parse(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidTicket {
                message: format!("invalid base64: {}", e),
            })?;
        let ticket: AuthTicket =
            serde_json::from_slice(&bytes).map_err(|e| Error::InvalidTicket {
                message: format!("invalid ticket payload: {}", e),
            })?;

        if ticket.allocation_id.is_empty() {
            return Err(Error::InvalidTicket {
                message: "ticket has no allocation id".to_string(),
            });
        }
        if ticket.reference_type != REF_TYPE_FILE && ticket.reference_type != REF_TYPE_DIR {
            return Err(Error::InvalidTicket {
                message: format!("unknown reference type {:?}", ticket.reference_type),
            });
        }

        Ok(ticket)
    }

    /// Re-encode the ticket to its shareable base64 form.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| Error::InvalidTicket {
            message: format!("failed to serialize ticket: {}", e),
        })?;
        Ok(BASE64.encode(json))
    }

    /// Allocation ID the ticket grants access into.
    pub fn allocation_id(&self) -> &str {
        &self.allocation_id
    }

    /// True if the ticket covers a directory rather than a single file.
    pub fn is_dir(&self) -> bool {
        self.reference_type == REF_TYPE_DIR
    }

    /// Name of the shared file.
    ///
    /// Directory tickets carry no filename; the caller supplies a lookup
    /// hash to pick a file instead.
    pub fn file_name(&self) -> Result<&str> {
        if self.file_name.is_empty() {
            return Err(Error::TicketIntrospection {
                message: "ticket carries no file name".to_string(),
            });
        }
        Ok(&self.file_name)
    }

    /// Lookup hash of the shared object.
    pub fn lookup_hash(&self) -> Result<&str> {
        if self.file_path_hash.is_empty() {
            return Err(Error::TicketIntrospection {
                message: "ticket carries no lookup hash".to_string(),
            });
        }
        Ok(&self.file_path_hash)
    }

    /// True if the ticket's expiration timestamp has passed.
    ///
    /// A zero expiration means the ticket never expires.
    pub fn is_expired(&self, now_unix: i64) -> bool {
        self.expiration > 0 && now_unix >= self.expiration
    }
}
