//! Tracing/logging setup shared by binaries and tests.

/// Initialize process-wide tracing with the `RUST_LOG` filter (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide tracing with an explicit filter directive,
/// e.g. the `log_filter` of the engine configuration.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_with_filter(directive: &str) -> bool {
    tracing::init_with_filter(directive)
}

/// Subscriber construction (filters, JSON formatting).
pub mod tracing;
