//! HTTP reference implementation of the resolver and engine interfaces.
//!
//! Allocations are resolved through a JSON gateway; downloads stream from
//! the allocation's blobbers with per-blobber failover. Every blobber is
//! treated as holding a full replica; erasure-coded reconstruction and
//! payload decryption belong to a real storage SDK, not this client.

mod engine;
mod resolver;

pub use engine::HttpAllocation;
pub use resolver::HttpResolver;
