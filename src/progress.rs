//! Progress reporting for mirror runs: an `indicatif` spinner counting merged items.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner with a running item count. `ProgressScope::hidden()` draws nothing, so
/// callers never branch on whether progress is enabled.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn spinner<T: Into<String>>(label: T) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} {pos} items  {per_sec}  elapsed: {elapsed_precise}") {
            pb.set_style(style);
        }
        pb.set_message(label.into());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn hidden() -> Self {
        Self { pb: ProgressBar::hidden() }
    }

    /// `spinner(label)` when `enabled`, otherwise `hidden()`.
    pub fn new<T: Into<String>>(enabled: bool, label: T) -> Self {
        if enabled { Self::spinner(label) } else { Self::hidden() }
    }

    #[inline]
    pub fn inc_items(&self, delta: u64) {
        self.pb.inc(delta);
    }

    pub fn set_label<T: Into<String>>(&self, label: T) {
        self.pb.set_message(label.into());
    }

    pub fn finish<T: Into<String>>(&self, msg: T) {
        self.pb.finish_with_message(msg.into());
    }
}
