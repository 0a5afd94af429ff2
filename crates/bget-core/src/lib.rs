//! bget-core: Shared library for the bget blobber download client.
//!
//! This crate provides:
//! - The status/completion bridge joining asynchronous transfers to a
//!   blocking caller
//! - The progress-sink contract between engines and their callers
//! - Allocation resolver and transfer-handle interfaces
//! - Auth-ticket decoding and introspection
//! - Error taxonomy, logging setup, and configuration constants

pub mod bridge;
pub mod constants;
pub mod error;
pub mod logging;
pub mod progress;
pub mod storage;
pub mod ticket;

pub use bridge::{BridgeOutcome, StatusBridge};
pub use error::{Error, Result};
pub use logging::{LogFormat, init_logging};
pub use progress::{NoOpSink, ProgressSink, UnitOutcome};
pub use storage::{Allocation, AllocationResolver, BlobberInfo, TransferHandle};
pub use ticket::AuthTicket;
