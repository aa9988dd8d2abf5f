//! Time windows — declared local-time spans and their concrete projections.

use chrono::{NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::state::OutletState;
use crate::time::Timestamp;

/// A fixed daily activation window in device-local time.
///
/// Invariant (enforced by the schedule validator): `cycle_on < cycle_off`
/// within the same calendar day. Windows never span midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub cycle_on: NaiveTime,
    pub cycle_off: NaiveTime,
}

impl TimeWindow {
    /// Whether the declared pair would wrap past local midnight.
    #[must_use]
    pub fn spans_midnight(&self) -> bool {
        self.cycle_on >= self.cycle_off
    }

    /// Project this window onto the calendar date of `now` in `tz`.
    ///
    /// Returns `None` when either edge does not exist as a local time on
    /// that date (a DST spring-forward gap); ambiguous local times resolve
    /// to their earliest mapping.
    #[must_use]
    pub fn materialize(&self, tz: Tz, now: Timestamp) -> Option<ConcreteWindow> {
        let date = Utc
            .timestamp_opt(now, 0)
            .single()?
            .with_timezone(&tz)
            .date_naive();
        let start = tz
            .from_local_datetime(&date.and_time(self.cycle_on))
            .earliest()?
            .timestamp();
        let end = tz
            .from_local_datetime(&date.and_time(self.cycle_off))
            .earliest()?
            .timestamp();
        Some(ConcreteWindow {
            start,
            end,
            state: OutletState::On,
        })
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}",
            self.cycle_on.format("%H:%M:%S"),
            self.cycle_off.format("%H:%M:%S")
        )
    }
}

/// A window resolved to concrete epoch seconds, half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcreteWindow {
    pub start: Timestamp,
    pub end: Timestamp,
    /// State the outlet holds while inside the window.
    pub state: OutletState,
}

impl ConcreteWindow {
    #[must_use]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }
}

/// Epoch second of the next local midnight strictly after `now` in `tz`.
#[must_use]
pub fn next_local_midnight(tz: Tz, now: Timestamp) -> Option<Timestamp> {
    let date = Utc
        .timestamp_opt(now, 0)
        .single()?
        .with_timezone(&tz)
        .date_naive()
        .succ_opt()?;
    Some(
        tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()?
            .timestamp(),
    )
}
