//! Client CLI implementation.
//!
//! Provides command-line argument parsing using clap. The subcommand enum is
//! the explicit command table: commands exist only because they are listed
//! here and dispatched from `main`, never through registration side effects.

mod parsing;
mod types;

#[cfg(test)]
mod tests;

pub use parsing::{DownloadRequest, DownloadSource};
pub use types::*;
