//! User interface module - terminal output for a run.
//!
//! - `formatter` - Pure formatting functions
//! - This module - Logging setup for the binary

use tracing_subscriber::EnvFilter;

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_outcome, display_status, display_success,
    error_annotation,
};

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so stdout stays free for the run summary and pipeline
/// commands. `RUST_LOG` overrides the default `info` level; colours are off in CI.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let in_ci = std::env::var_os("CI").is_some();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!in_ci)
        .with_target(false)
        .try_init();
}
