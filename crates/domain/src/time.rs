//! Time helpers — epoch timestamps and `HH:MM:SS` literals.

use chrono::{NaiveTime, Utc};

/// Unix epoch seconds. All timestamps crossing crate boundaries use this.
pub type Timestamp = i64;

/// Seconds in one calendar day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Return the current time as epoch seconds.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now().timestamp()
}

/// Parse a 24-hour `HH:MM:SS` time-of-day literal.
///
/// # Errors
///
/// Returns the underlying [`chrono::ParseError`] for anything that is not a
/// valid time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
}

/// Parse an `HH:MM:SS` literal interpreted as elapsed hours:minutes:seconds,
/// returning the total in seconds.
///
/// Unlike [`parse_time_of_day`], the hour part may exceed 23 (`48:00:00` is
/// two days).
#[must_use]
pub fn parse_duration(value: &str) -> Option<i64> {
    let mut parts = value.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds)
    {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}
