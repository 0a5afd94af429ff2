//! Allocation resolution and transfer-engine interfaces.
//!
//! These are the seams the CLI drives: a resolver maps an allocation ID or
//! auth ticket to a transfer-capable handle, and the handle performs the
//! actual multi-blobber download. Resolution failures are synchronous; the
//! completion bridge is never engaged for them. Each `download_*` call
//! either rejects synchronously (no callback will ever arrive) or accepts
//! the unit and later delivers exactly one terminal callback to the sink.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::progress::ProgressSink;
use crate::ticket::AuthTicket;

/// A storage-provider node holding data for an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobberInfo {
    /// Provider identity.
    pub id: String,
    /// Base URL of the provider's HTTP endpoint.
    pub url: String,
}

/// A caller's reserved storage space across a set of blobbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Allocation identifier.
    pub id: String,
    /// Total reserved size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Blobbers holding the allocation's data.
    pub blobbers: Vec<BlobberInfo>,
}

/// Maps an allocation ID or auth ticket to a transfer-capable handle.
#[async_trait]
pub trait AllocationResolver: Send + Sync {
    /// Handle type produced by this resolver.
    type Handle: TransferHandle;

    /// Resolve an allocation by its ID.
    async fn resolve(&self, allocation_id: &str) -> Result<Self::Handle>;

    /// Resolve the allocation an auth ticket grants access into.
    async fn resolve_auth_ticket(&self, ticket: &AuthTicket) -> Result<Self::Handle>;
}

/// Transfer engine exposed by a resolved allocation.
///
/// Every method is fire-and-signal: a successful return means the unit was
/// accepted and exactly one terminal callback will reach the sink later,
/// from an execution context the caller does not control. An `Err` return
/// means the unit was rejected outright and no callback will ever arrive;
/// the caller must not wait on the sink's bridge in that case.
#[async_trait]
pub trait TransferHandle: Send + Sync {
    /// The allocation this handle transfers against.
    fn allocation(&self) -> &Allocation;

    /// Download a file by remote path.
    async fn download_file(
        &self,
        local_path: &Path,
        remote_path: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()>;

    /// Download only the thumbnail of a file.
    async fn download_thumbnail(
        &self,
        local_path: &Path,
        remote_path: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()>;

    /// Download a shared file through an auth ticket.
    async fn download_from_ticket(
        &self,
        local_path: &Path,
        ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()>;

    /// Download a shared file's thumbnail through an auth ticket.
    async fn download_thumbnail_from_ticket(
        &self,
        local_path: &Path,
        ticket: &AuthTicket,
        lookup_hash: &str,
        file_name: &str,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_deserializes_from_gateway_payload() {
        let json = r#"{
            "id": "alloc-1",
            "size": 1048576,
            "blobbers": [
                {"id": "b1", "url": "http://blobber-1:5051"},
                {"id": "b2", "url": "http://blobber-2:5051"}
            ]
        }"#;

        let alloc: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(alloc.id, "alloc-1");
        assert_eq!(alloc.size, 1048576);
        assert_eq!(alloc.blobbers.len(), 2);
        assert_eq!(alloc.blobbers[0].url, "http://blobber-1:5051");
    }

    #[test]
    fn allocation_size_defaults_to_zero() {
        let json = r#"{"id": "alloc-1", "blobbers": []}"#;
        let alloc: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(alloc.size, 0);
    }
}
