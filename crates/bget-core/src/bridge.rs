//! Completion synchronization between asynchronous transfers and a
//! blocking caller.
//!
//! A transfer engine's download call is fire-and-signal: it starts work and
//! returns immediately, reporting completion through its progress sink on a
//! thread the caller does not control. The caller, however, is a synchronous
//! program that must not exit before the transfer finishes. `StatusBridge`
//! converts one or more asynchronous terminal signals into a single blocking
//! join point, without the engine knowing anything about how the caller
//! waits.
//!
//! The hazard class to keep in mind: any failure the engine reports
//! *synchronously* (invalid allocation, malformed ticket, rejected request)
//! means no terminal callback will ever arrive. Callers must only wait on a
//! bridge after the engine accepted the request.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};
use crate::progress::{ProgressSink, UnitOutcome};

/// Aggregated result of all units awaited by a bridge.
///
/// Aggregation rule: failure dominates. The aggregate is a success only if
/// every unit completed successfully; the first failure observed (in
/// completion order) supplies the error detail. Individual outcomes remain
/// queryable for callers that report per-unit.
#[derive(Debug, Clone)]
pub struct BridgeOutcome {
    outcomes: Vec<UnitOutcome>,
}

impl BridgeOutcome {
    /// True if every unit completed successfully.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(UnitOutcome::is_success)
    }

    /// Detail of the first failure, in completion order.
    pub fn first_failure(&self) -> Option<&str> {
        self.outcomes.iter().find_map(UnitOutcome::error)
    }

    /// All per-unit outcomes, in completion order.
    pub fn outcomes(&self) -> &[UnitOutcome] {
        &self.outcomes
    }

    /// Total bytes across successfully completed units.
    pub fn bytes_transferred(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                UnitOutcome::Completed { bytes } => *bytes,
                UnitOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Convert to a `Result`, surfacing the first failure as a transfer
    /// error.
    pub fn into_result(self) -> Result<u64> {
        match self.first_failure() {
            None => Ok(self.bytes_transferred()),
            Some(detail) => Err(Error::Transfer {
                message: detail.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
struct BridgeState {
    /// Terminal signals still outstanding.
    remaining: usize,
    /// Observed terminal results, in completion order.
    outcomes: Vec<UnitOutcome>,
    /// Last progress snapshot (bytes_transferred, total_bytes).
    progress: Option<(u64, u64)>,
}

/// Blocks a caller until a fixed number of terminal callbacks have arrived.
///
/// Constructing the bridge registers the expected unit count; hand it (or a
/// sink wrapping it) to the engine, then call [`wait`](Self::wait). The
/// callback entry points may be invoked concurrently from multiple engine
/// workers; all shared state is serialized under one mutex.
#[derive(Debug)]
pub struct StatusBridge {
    expected: usize,
    state: Mutex<BridgeState>,
    done: Condvar,
}

impl StatusBridge {
    /// Create a bridge awaiting exactly `expected` terminal signals.
    ///
    /// `expected = 0` is accepted: `wait` returns immediately.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(BridgeState {
                remaining: expected,
                outcomes: Vec::with_capacity(expected),
                progress: None,
            }),
            done: Condvar::new(),
        }
    }

    /// Number of terminal signals this bridge was registered for.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Terminal signals still outstanding.
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().remaining
    }

    /// Last progress snapshot reported by the engine.
    pub fn progress(&self) -> Option<(u64, u64)> {
        self.state.lock().unwrap().progress
    }

    /// Block the calling thread until every registered unit has delivered
    /// its terminal callback, then return the aggregated outcome.
    ///
    /// Returns immediately once all signals have arrived; calling again
    /// after that yields the same outcome without blocking. Never call this
    /// unless the engine accepted the request; a synchronous rejection
    /// means no signal will ever arrive and the wait would hang.
    pub fn wait(&self) -> BridgeOutcome {
        let mut state = self.state.lock().unwrap();
        while state.remaining > 0 {
            state = self.done.wait(state).unwrap();
        }
        BridgeOutcome {
            outcomes: state.outcomes.clone(),
        }
    }

    /// Like [`wait`](Self::wait), but give up after `timeout`.
    ///
    /// Returns `None` if the registered units have not all completed in
    /// time. The engine is not cancelled; its late signals are still
    /// absorbed by the bridge.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<BridgeOutcome> {
        let deadline_state = self
            .done
            .wait_timeout_while(self.state.lock().unwrap(), timeout, |s| s.remaining > 0)
            .unwrap();
        let (state, result) = deadline_state;
        if result.timed_out() && state.remaining > 0 {
            return None;
        }
        Some(BridgeOutcome {
            outcomes: state.outcomes.clone(),
        })
    }
}

impl ProgressSink for StatusBridge {
    fn on_progress(&self, bytes_transferred: u64, total_bytes: u64) {
        // Updates the snapshot only; completion accounting is untouched.
        let mut state = self.state.lock().unwrap();
        state.progress = Some((bytes_transferred, total_bytes));
    }

    fn on_complete(&self, outcome: UnitOutcome) {
        let mut state = self.state.lock().unwrap();
        if state.remaining == 0 {
            // Each registered unit is consumable exactly once. A completion
            // beyond the registered count is an engine bug; absorbing it
            // keeps the counter from going negative and a later wait from
            // being phantom-woken.
            warn!(
                expected = self.expected,
                ?outcome,
                "discarding terminal signal beyond registered count"
            );
            return;
        }
        state.outcomes.push(outcome);
        state.remaining -= 1;
        if state.remaining == 0 {
            self.done.notify_all();
        }
    }
}
