//! Streaming download engine over the allocation's blobbers.
//!
//! Fire-and-signal: each `download_*` call validates synchronously, spawns
//! the transfer task, and returns. The task streams from the first blobber
//! that can serve the request (bounded retries, then failover), writes to a
//! partial file renamed into place on success, and delivers exactly one
//! terminal signal to the sink.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use bget_core::constants::{BLOBBER_ATTEMPTS, PARTIAL_EXTENSION, RETRY_BACKOFF};
use bget_core::error::{Error, Result};
use bget_core::progress::{ProgressSink, UnitOutcome};
use bget_core::storage::{Allocation, BlobberInfo, TransferHandle};
use bget_core::ticket::AuthTicket;

/// Transfer-capable handle for one resolved allocation.
#[derive(Debug)]
pub struct HttpAllocation {
    allocation: Allocation,
    client: reqwest::Client,
}

/// One accepted download unit.
#[derive(Debug, Clone)]
struct FetchSpec {
    /// Query parameters for each blobber's download endpoint.
    query: Vec<(&'static str, String)>,
    local_path: PathBuf,
}

impl HttpAllocation {
    pub fn new(allocation: Allocation, client: reqwest::Client) -> Self {
        Self { allocation, client }
    }

    /// Synchronous checks shared by every download variant. A failure here
    /// means the unit was never accepted and no callback will be issued.
    fn validate_local_path(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(Error::Transfer {
                message: "local path is empty".to_string(),
            });
        }
        if path.is_dir() {
            return Err(Error::Transfer {
                message: format!("{} is a directory, give a file path", path.display()),
            });
        }
        if path.exists() {
            return Err(Error::Transfer {
                message: format!("{} already exists", path.display()),
            });
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(Error::Transfer {
                    message: format!("local directory {} does not exist", parent.display()),
                });
            }
        }
        Ok(())
    }

    fn accept(&self, spec: FetchSpec, sink: Arc<dyn ProgressSink>) -> Result<()> {
        Self::validate_local_path(&spec.local_path)?;

        let client = self.client.clone();
        let blobbers = self.allocation.blobbers.clone();
        tokio::spawn(run_transfer(client, blobbers, spec, sink));
        Ok(())
    }

    fn path_query(&self, remote_path: &str, thumbnail: bool) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("allocation", self.allocation.id.clone()),
            ("path", remote_path.to_string()),
        ];
        if thumbnail {
            query.push(("content", "thumbnail".to_string()));
        }
        query
    }

    fn ticket_query(
        &self,
        ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        thumbnail: bool,
    ) -> Result<Vec<(&'static str, String)>> {
        let mut query = vec![
            ("allocation", ticket.allocation_id().to_string()),
            ("auth_token", ticket.encode()?),
            ("path_hash", lookup_hash.to_string()),
            ("file_name", file_name.to_string()),
        ];
        if thumbnail {
            query.push(("content", "thumbnail".to_string()));
        }
        Ok(query)
    }
}

#[async_trait]
impl TransferHandle for HttpAllocation {
    fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    async fn download_file(
        &self,
        local_path: &Path,
        remote_path: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.accept(
            FetchSpec {
                query: self.path_query(remote_path, false),
                local_path: local_path.to_path_buf(),
            },
            sink,
        )
    }

    async fn download_thumbnail(
        &self,
        local_path: &Path,
        remote_path: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.accept(
            FetchSpec {
                query: self.path_query(remote_path, true),
                local_path: local_path.to_path_buf(),
            },
            sink,
        )
    }

    async fn download_from_ticket(
        &self,
        local_path: &Path,
        ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.accept(
            FetchSpec {
                query: self.ticket_query(ticket, lookup_hash, file_name, false)?,
                local_path: local_path.to_path_buf(),
            },
            sink,
        )
    }

    async fn download_thumbnail_from_ticket(
        &self,
        local_path: &Path,
        ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.accept(
            FetchSpec {
                query: self.ticket_query(ticket, lookup_hash, file_name, true)?,
                local_path: local_path.to_path_buf(),
            },
            sink,
        )
    }
}

/// Try each blobber in turn until one serves the request, then deliver the
/// single terminal signal.
async fn run_transfer(
    client: reqwest::Client,
    blobbers: Vec<BlobberInfo>,
    spec: FetchSpec,
    sink: Arc<dyn ProgressSink>,
) {
    let mut last_error = "no blobbers available".to_string();

    for blobber in &blobbers {
        for attempt in 1..=BLOBBER_ATTEMPTS {
            match fetch_from_blobber(&client, blobber, &spec, sink.as_ref()).await {
                Ok(bytes) => {
                    debug!(blobber = %blobber.id, bytes, "download served");
                    sink.on_complete(UnitOutcome::completed(bytes));
                    return;
                }
                Err(e) => {
                    warn!(
                        blobber = %blobber.id,
                        attempt,
                        error = %e,
                        "blobber fetch failed"
                    );
                    last_error = format!("{}: {}", blobber.id, e);
                    if attempt < BLOBBER_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }
    }

    sink.on_complete(UnitOutcome::failed(last_error));
}

async fn fetch_from_blobber(
    client: &reqwest::Client,
    blobber: &BlobberInfo,
    spec: &FetchSpec,
    sink: &dyn ProgressSink,
) -> Result<u64> {
    let url = format!("{}/v1/file/download", blobber.url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .query(&spec.query)
        .send()
        .await
        .map_err(|e| Error::Transport {
            message: format!("request to {} failed: {}", url, e),
        })?;

    if !response.status().is_success() {
        return Err(Error::Transfer {
            message: format!("blobber returned {}", response.status()),
        });
    }

    let partial = partial_path(&spec.local_path);
    let result = stream_to_file(response, &partial, sink).await;
    match result {
        Ok(bytes) => {
            fs::rename(&partial, &spec.local_path).await?;
            Ok(bytes)
        }
        Err(e) => {
            let _ = fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    mut response: reqwest::Response,
    partial: &Path,
    sink: &dyn ProgressSink,
) -> Result<u64> {
    let total = response.content_length().unwrap_or(0);
    let mut file = File::create(partial).await?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = response.chunk().await.map_err(|e| Error::Transport {
        message: format!("stream interrupted: {}", e),
    })? {
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        sink.on_progress(downloaded, total.max(downloaded));
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(downloaded)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(PARTIAL_EXTENSION);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bget_core::progress::NoOpSink;
    use bget_core::ticket::REF_TYPE_FILE;

    fn allocation() -> Allocation {
        Allocation {
            id: "alloc-1".to_string(),
            size: 0,
            blobbers: vec![BlobberInfo {
                id: "b1".to_string(),
                url: "http://blobber-1:5051/".to_string(),
            }],
        }
    }

    fn handle() -> HttpAllocation {
        HttpAllocation::new(allocation(), reqwest::Client::new())
    }

    #[test]
    fn partial_path_appends_extension() {
        assert_eq!(
            partial_path(Path::new("/tmp/out.bin")),
            PathBuf::from("/tmp/out.bin.bget.partial")
        );
    }

    #[test]
    fn path_query_includes_allocation_and_path() {
        let query = handle().path_query("/docs/report.pdf", false);
        assert!(query.contains(&("allocation", "alloc-1".to_string())));
        assert!(query.contains(&("path", "/docs/report.pdf".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "content"));
    }

    #[test]
    fn thumbnail_query_marks_the_content() {
        let query = handle().path_query("/docs/report.pdf", true);
        assert!(query.contains(&("content", "thumbnail".to_string())));
    }

    #[test]
    fn ticket_query_carries_the_encoded_ticket() {
        let ticket = AuthTicket {
            allocation_id: "alloc-1".to_string(),
            owner_id: "owner".to_string(),
            file_name: "report.pdf".to_string(),
            file_path_hash: "hash-1".to_string(),
            reference_type: REF_TYPE_FILE.to_string(),
            expiration: 0,
            signature: "sig".to_string(),
        };

        let query = handle()
            .ticket_query(&ticket, "hash-1", "report.pdf", false)
            .unwrap();
        assert!(query.contains(&("path_hash", "hash-1".to_string())));
        assert!(query.contains(&("file_name", "report.pdf".to_string())));
        let token = query
            .iter()
            .find(|(k, _)| *k == "auth_token")
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(AuthTicket::parse(&token).unwrap(), ticket);
    }

    #[tokio::test]
    async fn download_into_missing_directory_is_rejected_synchronously() {
        let sink: Arc<dyn ProgressSink> = Arc::new(NoOpSink);
        let err = handle()
            .download_file(
                Path::new("/definitely/not/a/real/dir/out.bin"),
                "/docs/report.pdf",
                sink,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transfer { .. }));
    }

    #[tokio::test]
    async fn download_over_existing_file_is_rejected_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("out.bin");
        std::fs::write(&existing, b"old").unwrap();

        let sink: Arc<dyn ProgressSink> = Arc::new(NoOpSink);
        let err = handle()
            .download_file(&existing, "/docs/report.pdf", sink)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transfer { .. }));
    }
}
