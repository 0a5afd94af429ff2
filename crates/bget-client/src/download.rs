//! The download command flow.
//!
//! Resolves the allocation, hands a progress sink to the transfer engine,
//! and blocks on the completion bridge until the engine's terminal signal
//! arrives. Every synchronous failure (usage, resolution, ticket
//! introspection, outright rejection) returns before the bridge is waited
//! on; once an engine rejects a request, no terminal callback will ever
//! arrive and waiting would hang forever.

use std::sync::Arc;

use tracing::{debug, info};

use bget_core::bridge::{BridgeOutcome, StatusBridge};
use bget_core::error::{Error, Result};
use bget_core::storage::{AllocationResolver, TransferHandle};
use bget_core::ticket::AuthTicket;

use crate::cli::{DownloadRequest, DownloadSource};
use crate::status;

/// Run a validated download request against a resolver.
///
/// Returns the number of bytes written on success. The call blocks (via a
/// blocking task, keeping the runtime's workers free) until the engine
/// reports the transfer finished one way or the other.
pub async fn run_download<R: AllocationResolver>(
    resolver: &R,
    request: &DownloadRequest,
    show_progress: bool,
) -> Result<u64> {
    let bridge = Arc::new(StatusBridge::new(1));
    let sink = status::make_sink(Arc::clone(&bridge), &request.display_name(), show_progress);

    match &request.source {
        DownloadSource::RemotePath {
            allocation_id,
            remote_path,
        } => {
            let handle = resolver.resolve(allocation_id).await?;
            debug!(
                allocation = %handle.allocation().id,
                remote_path,
                thumbnail = request.thumbnail,
                "allocation resolved"
            );

            if request.thumbnail {
                handle
                    .download_thumbnail(&request.local_path, remote_path, sink)
                    .await?;
            } else {
                handle
                    .download_file(&request.local_path, remote_path, sink)
                    .await?;
            }
        }
        DownloadSource::AuthTicket {
            ticket,
            lookup_hash,
        } => {
            let ticket = AuthTicket::parse(ticket)?;
            let handle = resolver.resolve_auth_ticket(&ticket).await?;
            let file_name = ticket.file_name()?;

            if ticket.is_dir() && lookup_hash.is_none() {
                return Err(Error::TicketIntrospection {
                    message: "auth ticket is for a directory; the lookuphash flag is required"
                        .to_string(),
                });
            }
            let lookup_hash = match lookup_hash {
                Some(hash) => hash.clone(),
                None => ticket.lookup_hash()?.to_string(),
            };
            debug!(
                allocation = %handle.allocation().id,
                lookup_hash,
                thumbnail = request.thumbnail,
                "auth ticket resolved"
            );

            if request.thumbnail {
                handle
                    .download_thumbnail_from_ticket(
                        &request.local_path,
                        &ticket,
                        &lookup_hash,
                        file_name,
                        sink,
                    )
                    .await?;
            } else {
                handle
                    .download_from_ticket(
                        &request.local_path,
                        &ticket,
                        &lookup_hash,
                        file_name,
                        sink,
                    )
                    .await?;
            }
        }
    }

    // The engine accepted the request; only now is the bridge engaged.
    let outcome = wait_for_completion(bridge).await?;
    let bytes = outcome.into_result()?;
    info!(bytes, local_path = %request.local_path.display(), "download finished");
    Ok(bytes)
}

async fn wait_for_completion(bridge: Arc<StatusBridge>) -> Result<BridgeOutcome> {
    tokio::task::spawn_blocking(move || bridge.wait())
        .await
        .map_err(|e| Error::Transfer {
            message: format!("completion wait aborted: {}", e),
        })
}
