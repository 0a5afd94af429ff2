//! bget-client: Command-line client for blobber-network downloads.
//!
//! Provides:
//! - CLI argument parsing and flag validation
//! - The download command flow over the resolver/engine interfaces
//! - A terminal status bar wired to the completion bridge
//! - An HTTP reference resolver and streaming transfer engine

pub mod cli;
pub mod download;
pub mod http;
pub mod status;

pub use cli::{Cli, Command, DownloadArgs, DownloadRequest, DownloadSource};
pub use download::run_download;
pub use http::{HttpAllocation, HttpResolver};
pub use status::StatusBar;
