//! Progress-sink contract between transfer engines and their callers.
//!
//! An engine is handed an `Arc<dyn ProgressSink>` and drives it from
//! whatever concurrency substrate it uses internally. Progress callbacks may
//! fire any number of times; the terminal callback fires exactly once per
//! unit of work the engine was asked to perform.

/// Terminal result for one unit of transfer work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The unit finished successfully.
    Completed {
        /// Bytes written for this unit.
        bytes: u64,
    },
    /// The unit failed.
    Failed {
        /// Human-readable failure detail.
        error: String,
    },
}

impl UnitOutcome {
    /// Build a success outcome.
    pub fn completed(bytes: u64) -> Self {
        UnitOutcome::Completed { bytes }
    }

    /// Build a failure outcome.
    pub fn failed(error: impl Into<String>) -> Self {
        UnitOutcome::Failed {
            error: error.into(),
        }
    }

    /// Check whether this unit succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Completed { .. })
    }

    /// Failure detail, if this unit failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            UnitOutcome::Completed { .. } => None,
            UnitOutcome::Failed { error } => Some(error),
        }
    }
}

/// Callback capability handed to a transfer engine.
///
/// Implementations must be safe to invoke concurrently from multiple engine
/// workers, and must not assume any ordering between progress updates and
/// the terminal callback.
pub trait ProgressSink: Send + Sync {
    /// Non-terminal progress update. May fire zero or more times per unit;
    /// must never affect completion accounting.
    fn on_progress(&self, bytes_transferred: u64, total_bytes: u64);

    /// Terminal callback, exactly once per unit of work.
    fn on_complete(&self, outcome: UnitOutcome);
}

/// A sink that ignores all callbacks.
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn on_progress(&self, _bytes_transferred: u64, _total_bytes: u64) {}
    fn on_complete(&self, _outcome: UnitOutcome) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_outcome_success() {
        let outcome = UnitOutcome::completed(4096);
        assert!(outcome.is_success());
        assert_eq!(outcome.error(), None);
    }

    #[test]
    fn unit_outcome_failure() {
        let outcome = UnitOutcome::failed("blobber unreachable");
        assert!(!outcome.is_success());
        assert_eq!(outcome.error(), Some("blobber unreachable"));
    }

    #[test]
    fn noop_sink_accepts_callbacks() {
        let sink = NoOpSink;
        sink.on_progress(10, 100);
        sink.on_complete(UnitOutcome::completed(100));
    }
}
