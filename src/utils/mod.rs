//! Binary-side utilities.
//!
//! ## Modules
//!
//! - [`config`] - Build defaults stored in the platform config directory
//! - [`logger`] - `log` backend writing coloured levels to stderr
//! - [`progress`] - Spinner phase sink (no-op without the `progress` feature)

pub mod config;
pub mod logger;
pub mod progress;

pub use config::{get_config_path, BuildConfig};
pub use progress::ProgressSink;
