//! Error types for bget-core.

use thiserror::Error;

/// Main error type for bget operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid flag combination or missing required argument.
    #[error("usage error: {message}")]
    Usage { message: String },

    /// Allocation or auth-ticket lookup failed before any transfer started.
    #[error("resolution error: {message}")]
    Resolution { message: String },

    /// No allocation exists for the given ID.
    #[error("allocation not found: {0}")]
    AllocationNotFound(String),

    /// Auth ticket could not be decoded or is structurally invalid.
    #[error("invalid auth ticket: {message}")]
    InvalidTicket { message: String },

    /// Auth-ticket introspection failed (missing filename, directory
    /// ticket without a lookup hash, and similar).
    #[error("ticket introspection error: {message}")]
    TicketIntrospection { message: String },

    /// Transfer rejected or failed.
    #[error("transfer error: {message}")]
    Transfer { message: String },

    /// Network-level failure talking to the gateway or a blobber.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Operation timed out.
    #[error("operation timed out")]
    Timeout,
}

impl Error {
    /// Returns true if this is a usage error, detected before any engine
    /// call was attempted.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage { .. })
    }

    /// Returns true if this error arose while resolving the allocation or
    /// introspecting the auth ticket.
    ///
    /// Resolution-stage errors are always synchronous: the completion bridge
    /// was never handed to an engine, so the caller must not wait on it.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Error::Resolution { .. }
                | Error::AllocationNotFound(_)
                | Error::InvalidTicket { .. }
                | Error::TicketIntrospection { .. }
        )
    }
}

/// Convenience result type for bget operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_usage() {
        let err = Error::Usage {
            message: "remotepath / authticket flag is missing".into(),
        };
        assert_eq!(
            err.to_string(),
            "usage error: remotepath / authticket flag is missing"
        );
    }

    #[test]
    fn error_display_allocation_not_found() {
        let err = Error::AllocationNotFound("abc123".into());
        assert_eq!(err.to_string(), "allocation not found: abc123");
    }

    #[test]
    fn error_display_transfer() {
        let err = Error::Transfer {
            message: "blobber unreachable".into(),
        };
        assert_eq!(err.to_string(), "transfer error: blobber unreachable");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn usage_classification() {
        assert!(Error::Usage {
            message: "allocation flag is missing".into()
        }
        .is_usage());
        assert!(!Error::Timeout.is_usage());
    }

    #[test]
    fn resolution_classification() {
        assert!(Error::Resolution {
            message: "gateway refused".into()
        }
        .is_resolution());
        assert!(Error::AllocationNotFound("x".into()).is_resolution());
        assert!(Error::InvalidTicket {
            message: "bad base64".into()
        }
        .is_resolution());
        assert!(Error::TicketIntrospection {
            message: "no filename".into()
        }
        .is_resolution());

        // Transfer-stage errors are not resolution errors
        assert!(!Error::Transfer {
            message: "failed".into()
        }
        .is_resolution());
        assert!(!Error::Timeout.is_resolution());
    }
}
