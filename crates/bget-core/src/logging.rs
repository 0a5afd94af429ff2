//! Tracing integration for structured logging.
//!
//! Shared by the CLI and any embedding service: verbosity-mapped levels,
//! optional file output, text or JSON format.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Result;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize the logging system.
///
/// `verbosity` maps 0=error up to 4+=trace; `RUST_LOG` overrides it when
/// set. Logs go to stderr unless `log_file` is given, so progress output on
/// the terminal stays readable.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>, format: LogFormat) -> Result<()> {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bget_core={},bget_client={}",
            level, level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let init_result = match (log_file, format) {
        (None, LogFormat::Text) => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(verbosity >= 3)
                    .with_line_number(verbosity >= 3),
            )
            .try_init(),
        (None, LogFormat::Json) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        (Some(path), LogFormat::Text) => {
            let file = open_log_file(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .with_target(true)
                        .with_file(verbosity >= 3)
                        .with_line_number(verbosity >= 3),
                )
                .try_init()
        }
        (Some(path), LogFormat::Json) => {
            let file = open_log_file(path)?;
            registry.with(fmt::layer().json().with_writer(file)).try_init()
        }
    };

    init_result.map_err(|e| crate::Error::Io(std::io::Error::other(e.to_string())))
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}

/// Initialize logging with defaults for testing.
///
/// Silently ignores errors (logging may already be initialized).
pub fn init_test_logging() {
    let _ = init_logging(2, None, LogFormat::Text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_default() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), "error");
        assert_eq!(level_for(2), "info");
        assert_eq!(level_for(7), "trace");
    }

    #[test]
    fn init_is_idempotent_in_tests() {
        init_test_logging();
        init_test_logging();
    }
}
