//! Tracing/logging setup shared by binaries and tests.

/// Default filter directive when neither `RUST_LOG` nor a configured default is given.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize process-wide tracing with [`DEFAULT_FILTER`].
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(DEFAULT_FILTER);
}

/// Initialize process-wide tracing, using `default_filter` when `RUST_LOG` is unset.
pub fn init_with_default(default_filter: &str) {
    tracing::init(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
