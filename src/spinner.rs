//! Progress indicator shown while a build tool runs.
//!
//! A `Spinner` is a scoped guard around an indicatif spinner: `start` begins
//! the steady tick, and `stop()` (or dropping the guard) ends it and clears
//! its line before the step's result is printed.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);
const TEMPLATE: &str = "{spinner:.blue} {msg} [{elapsed}]";

/// Running (or disabled) progress indicator
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Animate `message` on stdout
    pub fn start(message: impl Into<String>) -> Self {
        Self::start_on(ProgressDrawTarget::stdout(), message)
    }

    /// Animate `message` on any draw target
    pub fn start_on(target: ProgressDrawTarget, message: impl Into<String>) -> Self {
        let style = ProgressStyle::default_spinner()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(style);
        bar.set_message(message.into());
        bar.enable_steady_tick(TICK);

        Self { bar }
    }

    /// A spinner that draws nothing
    pub fn disabled() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.bar.is_hidden() && !self.bar.is_finished()
    }

    /// Stop the animation and clear its line
    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
