//! Operator progress reporting.
//!
//! The pipeline owns its transferred count and pushes it through an
//! injected sink after every written page; there is no ambient progress
//! state anywhere else.

use indicatif::{ProgressBar, ProgressStyle};

/// Sink for transfer progress updates.
pub trait ProgressSink: Send + Sync {
    /// Called after every successfully written page with the running total.
    fn on_page(&self, transferred: u64);

    /// Called once when the transfer completed successfully.
    fn on_complete(&self, transferred: u64);
}

/// Console sink: a single-line updating counter.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Creates the counter line.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("Records transferred: ~ {pos}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_page(&self, transferred: u64) {
        self.bar.set_position(transferred);
    }

    fn on_complete(&self, transferred: u64) {
        self.bar.set_position(transferred);
        self.bar.finish();
        println!("\nDone transferring index.");
    }
}

/// Sink that discards all updates.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_page(&self, _transferred: u64) {}
    fn on_complete(&self, _transferred: u64) {}
}
