//! Flag-combination validation for the download command.
//!
//! Usage errors are caught here, before any resolver or engine call, so a
//! bad invocation never engages the completion bridge.

use std::path::PathBuf;

use bget_core::error::{Error, Result};

use super::types::DownloadArgs;

/// Where the download comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// Explicit allocation plus remote path, for allocations the caller owns.
    RemotePath {
        allocation_id: String,
        remote_path: String,
    },
    /// Shareable auth ticket, with an optional lookup hash for directory
    /// tickets.
    AuthTicket {
        ticket: String,
        lookup_hash: Option<String>,
    },
}

/// A validated download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source: DownloadSource,
    pub local_path: PathBuf,
    pub thumbnail: bool,
}

impl DownloadRequest {
    /// Short label for progress display.
    pub fn display_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.local_path.display().to_string())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl DownloadArgs {
    /// Validate the flag combination into a request.
    ///
    /// Requires either `--remotepath` with `--allocation`, or
    /// `--authticket`. An explicit remote path takes precedence when both
    /// are given.
    pub fn validate(&self) -> Result<DownloadRequest> {
        let remotepath = non_empty(&self.remotepath);
        let authticket = non_empty(&self.authticket);

        let source = match (remotepath, authticket) {
            (Some(remote_path), _) => {
                let allocation_id = non_empty(&self.allocation).ok_or_else(|| Error::Usage {
                    message: "allocation flag is missing".to_string(),
                })?;
                DownloadSource::RemotePath {
                    allocation_id: allocation_id.to_string(),
                    remote_path: remote_path.to_string(),
                }
            }
            (None, Some(ticket)) => DownloadSource::AuthTicket {
                ticket: ticket.to_string(),
                lookup_hash: non_empty(&self.lookuphash).map(str::to_string),
            },
            (None, None) => {
                return Err(Error::Usage {
                    message: "remotepath / authticket flag is missing".to_string(),
                });
            }
        };

        Ok(DownloadRequest {
            source,
            local_path: self.localpath.clone(),
            thumbnail: self.thumbnail,
        })
    }
}
