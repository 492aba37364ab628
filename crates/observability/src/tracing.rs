//! Tracing/logging initialization.
//!
//! JSON lines with timestamps; spans emitted by the controller and storage
//! adapters carry `projection`, `entity_id` and `event_id` fields.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process from `RUST_LOG`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Initialize tracing/logging with `directive`, ignoring `RUST_LOG`.
///
/// An unparsable directive falls back to `info`.
pub fn init_with_filter(directive: &str) -> bool {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter)
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
