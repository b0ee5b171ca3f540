use chrono::DateTime;
use hermes_core::Timestamp;
use std::time::Duration;

/// Next wall-clock boundary strictly after `now` for the given period
///
/// `now` is truncated down to a multiple of `period` (counted from the Unix
/// epoch) and one period is added, so every caller in the process lands on
/// the same instants: with a 10 minute period, 09:03:27 becomes 09:10:00 and
/// 09:10:00 becomes 09:20:00.
pub fn next_boundary(now: Timestamp, period: Duration) -> Timestamp {
    let period_ms = period.as_millis() as i64;
    let fallback = now + chrono::Duration::milliseconds(period_ms.max(0));
    if period_ms <= 0 {
        return fallback;
    }

    let now_ms = now.timestamp_millis();
    let floor = now_ms - now_ms.rem_euclid(period_ms);
    DateTime::from_timestamp_millis(floor + period_ms).unwrap_or(fallback)
}

/// Boundary to tick on next, never at or before the `last` one broadcast
///
/// The wall clock and the sleep timer can disagree by a few milliseconds, so
/// a wake-up just short of a boundary would otherwise yield that same
/// boundary again.
pub fn next_tick(now: Timestamp, last: Option<Timestamp>, period: Duration) -> Timestamp {
    let tick = next_boundary(now, period);
    match last {
        Some(last) if tick <= last => next_boundary(last, period),
        _ => tick,
    }
}
