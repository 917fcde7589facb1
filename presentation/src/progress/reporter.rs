//! Spinner shown while waiting for the first token of a reply.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner covering the window between issuing a streaming request and
/// the first token arriving.
pub struct StreamProgress {
    bar: ProgressBar,
}

impl StreamProgress {
    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
    }

    /// Start spinning with the given message.
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop and erase the spinner (first token arrived, or the exchange
    /// ended without one).
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
