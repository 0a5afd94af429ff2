//! Scripted mock resolver and transfer engine for testing without a
//! network.
//!
//! `MockResolver` hands out `MockHandle`s that drive a progress sink the
//! way a real engine would: accept the unit, return immediately, then
//! report progress and a single terminal signal from a spawned task. The
//! script controls which of the failure classes fires (synchronous
//! resolution error, synchronous rejection, asynchronous failure) so tests
//! can cover every path the CLI has to short-circuit or wait on.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use bget_core::error::{Error, Result};
use bget_core::progress::{ProgressSink, UnitOutcome};
use bget_core::storage::{Allocation, AllocationResolver, BlobberInfo, TransferHandle};
use bget_core::ticket::{AuthTicket, REF_TYPE_DIR, REF_TYPE_FILE};

/// Scripted behavior for each accepted transfer unit.
#[derive(Debug, Clone)]
pub enum MockTransfer {
    /// Accept, emit `progress_events` updates, then complete successfully.
    Success { bytes: u64, progress_events: u32 },
    /// Accept, then complete with a failure outcome.
    Failure { error: String },
    /// Reject synchronously; no callback will ever be issued.
    SyncReject { message: String },
    /// Accept and never deliver a terminal signal (hang scenario).
    Never,
}

#[derive(Debug, Default)]
struct CallLog {
    calls: Vec<String>,
}

/// Shared script and call record backing a resolver and its handles.
#[derive(Debug)]
pub struct MockScript {
    allocation: Allocation,
    transfer: MockTransfer,
    completion_delay: Duration,
    log: Mutex<CallLog>,
}

impl MockScript {
    fn record(&self, call: impl Into<String>) {
        self.log.lock().unwrap().calls.push(call.into());
    }
}

/// Mock allocation resolver.
pub struct MockResolver {
    script: Arc<MockScript>,
    resolution_error: Option<String>,
}

impl MockResolver {
    /// Resolver that knows `allocation` and scripts its transfers.
    pub fn new(allocation: Allocation, transfer: MockTransfer) -> Self {
        Self {
            script: Arc::new(MockScript {
                allocation,
                transfer,
                completion_delay: Duration::from_millis(10),
                log: Mutex::new(CallLog::default()),
            }),
            resolution_error: None,
        }
    }

    /// Resolver whose lookups always fail synchronously.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Arc::new(MockScript {
                allocation: test_allocation(),
                transfer: MockTransfer::Never,
                completion_delay: Duration::ZERO,
                log: Mutex::new(CallLog::default()),
            }),
            resolution_error: Some(message.into()),
        }
    }

    /// Delay between accepting a unit and delivering its terminal signal.
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        Arc::get_mut(&mut self.script)
            .expect("configure the resolver before cloning handles")
            .completion_delay = delay;
        self
    }

    /// Methods invoked so far, in call order (resolver and handle).
    pub fn calls(&self) -> Vec<String> {
        self.script.log.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl AllocationResolver for MockResolver {
    type Handle = MockHandle;

    async fn resolve(&self, allocation_id: &str) -> Result<MockHandle> {
        self.script.record(format!("resolve:{}", allocation_id));
        if let Some(message) = &self.resolution_error {
            return Err(Error::Resolution {
                message: message.clone(),
            });
        }
        if allocation_id != self.script.allocation.id {
            return Err(Error::AllocationNotFound(allocation_id.to_string()));
        }
        Ok(MockHandle {
            script: Arc::clone(&self.script),
        })
    }

    async fn resolve_auth_ticket(&self, ticket: &AuthTicket) -> Result<MockHandle> {
        self.script
            .record(format!("resolve_auth_ticket:{}", ticket.allocation_id()));
        if let Some(message) = &self.resolution_error {
            return Err(Error::Resolution {
                message: message.clone(),
            });
        }
        Ok(MockHandle {
            script: Arc::clone(&self.script),
        })
    }
}

/// Transfer handle produced by [`MockResolver`].
pub struct MockHandle {
    script: Arc<MockScript>,
}

impl MockHandle {
    fn start(&self, call: String, sink: Arc<dyn ProgressSink>) -> Result<()> {
        self.script.record(call);
        match &self.script.transfer {
            MockTransfer::SyncReject { message } => Err(Error::Transfer {
                message: message.clone(),
            }),
            MockTransfer::Never => Ok(()),
            MockTransfer::Success {
                bytes,
                progress_events,
            } => {
                let bytes = *bytes;
                let events = *progress_events;
                let delay = self.script.completion_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    for i in 1..=events as u64 {
                        sink.on_progress(bytes * i / events.max(1) as u64, bytes);
                    }
                    sink.on_complete(UnitOutcome::completed(bytes));
                });
                Ok(())
            }
            MockTransfer::Failure { error } => {
                let error = error.clone();
                let delay = self.script.completion_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    sink.on_complete(UnitOutcome::failed(error));
                });
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TransferHandle for MockHandle {
    fn allocation(&self) -> &Allocation {
        &self.script.allocation
    }

    async fn download_file(
        &self,
        local_path: &Path,
        remote_path: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.start(
            format!("download_file:{}:{}", remote_path, local_path.display()),
            sink,
        )
    }

    async fn download_thumbnail(
        &self,
        local_path: &Path,
        remote_path: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.start(
            format!("download_thumbnail:{}:{}", remote_path, local_path.display()),
            sink,
        )
    }

    async fn download_from_ticket(
        &self,
        local_path: &Path,
        _ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.start(
            format!(
                "download_from_ticket:{}:{}:{}",
                lookup_hash,
                file_name,
                local_path.display()
            ),
            sink,
        )
    }

    async fn download_thumbnail_from_ticket(
        &self,
        local_path: &Path,
        _ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        self.start(
            format!(
                "download_thumbnail_from_ticket:{}:{}:{}",
                lookup_hash,
                file_name,
                local_path.display()
            ),
            sink,
        )
    }
}

/// A sink that records every callback it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    progress: Mutex<Vec<(u64, u64)>>,
    outcomes: Mutex<Vec<UnitOutcome>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress_events(&self) -> Vec<(u64, u64)> {
        self.progress.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<UnitOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, bytes_transferred: u64, total_bytes: u64) {
        self.progress
            .lock()
            .unwrap()
            .push((bytes_transferred, total_bytes));
    }

    fn on_complete(&self, outcome: UnitOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

/// A two-blobber allocation fixture.
pub fn test_allocation() -> Allocation {
    Allocation {
        id: "alloc-test-1".to_string(),
        size: 1 << 20,
        blobbers: vec![
            BlobberInfo {
                id: "blobber-1".to_string(),
                url: "http://blobber-1:5051".to_string(),
            },
            BlobberInfo {
                id: "blobber-2".to_string(),
                url: "http://blobber-2:5051".to_string(),
            },
        ],
    }
}

/// An encoded file auth ticket against [`test_allocation`].
pub fn test_file_ticket() -> String {
    AuthTicket {
        allocation_id: "alloc-test-1".to_string(),
        owner_id: "owner-test".to_string(),
        file_name: "report.pdf".to_string(),
        file_path_hash: "hash-report".to_string(),
        reference_type: REF_TYPE_FILE.to_string(),
        expiration: 0,
        signature: "sig-test".to_string(),
    }
    .encode()
    .expect("fixture ticket encodes")
}

/// An encoded directory auth ticket against [`test_allocation`].
///
/// Directory tickets carry the directory's name but no lookup hash; the
/// caller must supply one to pick a file.
pub fn test_dir_ticket() -> String {
    AuthTicket {
        allocation_id: "alloc-test-1".to_string(),
        owner_id: "owner-test".to_string(),
        file_name: "shared".to_string(),
        file_path_hash: String::new(),
        reference_type: REF_TYPE_DIR.to_string(),
        expiration: 0,
        signature: "sig-test".to_string(),
    }
    .encode()
    .expect("fixture ticket encodes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use bget_core::bridge::StatusBridge;

    #[tokio::test]
    async fn scripted_success_drives_the_sink() {
        let resolver = MockResolver::new(
            test_allocation(),
            MockTransfer::Success {
                bytes: 128,
                progress_events: 2,
            },
        );
        let handle = resolver.resolve("alloc-test-1").await.unwrap();

        let sink = Arc::new(RecordingSink::new());
        let engine_sink: Arc<dyn ProgressSink> = Arc::clone(&sink) as Arc<dyn ProgressSink>;
        handle
            .download_file(Path::new("/tmp/out.bin"), "/f", engine_sink)
            .await
            .unwrap();

        // The terminal signal arrives from the spawned engine task.
        for _ in 0..200 {
            if !sink.outcomes().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(sink.outcomes(), vec![UnitOutcome::completed(128)]);
        assert_eq!(sink.progress_events().len(), 2);
    }

    #[tokio::test]
    async fn scripted_failure_completes_a_bridge() {
        let resolver = MockResolver::new(
            test_allocation(),
            MockTransfer::Failure {
                error: "boom".to_string(),
            },
        );
        let handle = resolver.resolve("alloc-test-1").await.unwrap();

        let bridge = Arc::new(StatusBridge::new(1));
        let engine_sink: Arc<dyn ProgressSink> = Arc::clone(&bridge) as Arc<dyn ProgressSink>;
        handle
            .download_file(Path::new("/tmp/out.bin"), "/f", engine_sink)
            .await
            .unwrap();

        let waiter = Arc::clone(&bridge);
        let outcome = tokio::task::spawn_blocking(move || waiter.wait())
            .await
            .unwrap();
        assert_eq!(outcome.first_failure(), Some("boom"));
    }

    #[tokio::test]
    async fn sync_reject_issues_no_callback() {
        let resolver = MockResolver::new(
            test_allocation(),
            MockTransfer::SyncReject {
                message: "rejected".to_string(),
            },
        )
        .with_completion_delay(Duration::ZERO);
        let handle = resolver.resolve("alloc-test-1").await.unwrap();

        let sink = Arc::new(RecordingSink::new());
        let engine_sink: Arc<dyn ProgressSink> = Arc::clone(&sink) as Arc<dyn ProgressSink>;
        let err = handle
            .download_file(Path::new("/tmp/out.bin"), "/f", engine_sink)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transfer { .. }));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sink.outcomes().is_empty());
        assert!(sink.progress_events().is_empty());
    }
}
