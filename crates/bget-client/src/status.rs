//! Terminal status bar for downloads.
//!
//! `StatusBar` is the displaying progress sink the CLI hands to an engine:
//! it renders an indicatif bar and forwards every terminal signal to the
//! completion bridge the caller will block on. With display suppressed the
//! bridge itself is handed out as the sink.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use bget_core::bridge::StatusBridge;
use bget_core::progress::{ProgressSink, UnitOutcome};

/// Progress sink rendering an indicatif bar over a completion bridge.
pub struct StatusBar {
    bridge: Arc<StatusBridge>,
    bar: ProgressBar,
}

impl StatusBar {
    /// Create a status bar labelled with the download's file name.
    pub fn new(bridge: Arc<StatusBridge>, label: impl Into<String>) -> Self {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
                )
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_message(label.into());
        Self { bridge, bar }
    }
}

impl ProgressSink for StatusBar {
    fn on_progress(&self, bytes_transferred: u64, total_bytes: u64) {
        // Total is only known once the engine has headers back.
        if total_bytes > 0 && self.bar.length() != Some(total_bytes) {
            self.bar.set_length(total_bytes);
        }
        self.bar.set_position(bytes_transferred);
    }

    fn on_complete(&self, outcome: UnitOutcome) {
        match &outcome {
            UnitOutcome::Completed { .. } => self.bar.finish_with_message("done"),
            UnitOutcome::Failed { .. } => self.bar.abandon_with_message("failed"),
        }
        self.bridge.on_complete(outcome);
    }
}

/// Build the sink to hand to the engine.
pub fn make_sink(
    bridge: Arc<StatusBridge>,
    label: &str,
    show_progress: bool,
) -> Arc<dyn ProgressSink> {
    if show_progress {
        Arc::new(StatusBar::new(bridge, label))
    } else {
        bridge
    }
}
