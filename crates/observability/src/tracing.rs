//! Tracing/logging initialization.
//!
//! JSON lines on stdout with timestamps; the filter comes from `RUST_LOG`
//! when set, otherwise from the caller-supplied default.

use tracing_subscriber::EnvFilter;

/// Build the effective filter. Falls back to `info` if `default_filter` does not parse.
pub fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(super::DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
