//! Progress bar abstraction that becomes no-op when the `progress` feature is disabled

use crate::construct::PhaseSink;
use std::time::Duration;

#[cfg(feature = "progress")]
pub use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progress"))]
pub use self::noop::*;

#[cfg(not(feature = "progress"))]
mod noop {
    use std::time::Duration;

    /// No-op progress bar when `progress` feature is disabled
    #[derive(Debug, Clone)]
    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new_spinner() -> Self {
            ProgressBar
        }

        pub fn set_style(&self, _style: ProgressStyle) {}
        pub fn set_message(&self, _msg: impl Into<std::borrow::Cow<'static, str>>) {}
        pub fn enable_steady_tick(&self, _interval: Duration) {}
        pub fn println(&self, _msg: impl AsRef<str>) {}
        pub fn finish_and_clear(&self) {}
    }

    /// No-op progress style
    pub struct ProgressStyle;

    impl ProgressStyle {
        pub fn default_spinner() -> Self {
            ProgressStyle
        }

        pub fn template(self, _template: &str) -> Result<Self, std::convert::Infallible> {
            Ok(self)
        }
    }
}

/// Phase sink drawing a spinner with the running phase and printing each
/// finished phase with its duration.
#[derive(Debug)]
pub struct ProgressSink {
    bar: ProgressBar,
}

impl ProgressSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseSink for ProgressSink {
    fn phase_started(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn phase_finished(&self, name: &str, elapsed: Duration) {
        self.bar.println(format!("  {:<24} {:>10.2?}", name, elapsed));
        log::debug!("phase `{}` finished in {:.2?}", name, elapsed);
    }
}
