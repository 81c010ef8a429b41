//! Tracing setup for awake.
//!
//! Logs go to stderr so stdout stays clean for `--version`.

use tracing_subscriber::EnvFilter;

/// Fallback filter when the configured one does not parse
pub const DEFAULT_FILTER: &str = "warn";

pub fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
