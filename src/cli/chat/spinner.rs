use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(80);

/// Progress line on stderr while a request is in flight.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(label: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(label.into());
        bar.enable_steady_tick(TICK_INTERVAL);
        Self { bar }
    }

    /// No-op spinner for non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Stop ticking and erase the line.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
