//! Process-monotonic wall clock for event timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time, strictly later than any value previously returned in this process.
///
/// When the wall clock has not advanced (or stepped backwards) the result is
/// bumped one microsecond past the previous value. Events from other processes
/// or with explicit timestamps may still tie; the storage layer breaks those
/// ties by event id. Precision is microseconds so timestamps survive
/// round-trips through backends that do not store nanoseconds.
pub fn now_monotonic() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let next = |previous: i64| now.max(previous.saturating_add(1));
    let previous = match LAST_MICROS.fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
        Some(next(prev))
    }) {
        Ok(previous) | Err(previous) => previous,
    };
    let micros = next(previous);
    DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
}
