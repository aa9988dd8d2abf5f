//! Desired-state evaluation for fixed daily windows.

use chrono_tz::Tz;

use crate::schedule::window::TimeWindow;
use crate::state::OutletState;
use crate::time::Timestamp;

/// Evaluate ordered daily windows at `now`.
///
/// Returns [`OutletState::On`] for the first window (in declared order)
/// whose concrete `[start, end)` span contains `now`, otherwise `default`.
/// Pure function of its inputs — no persisted state is consulted. A window
/// whose edges do not exist as local times on the evaluation day (DST gap)
/// is ignored for that day.
#[must_use]
pub fn desired_state(
    windows: &[TimeWindow],
    default: OutletState,
    tz: Tz,
    now: Timestamp,
) -> OutletState {
    for window in windows {
        let Some(concrete) = window.materialize(tz, now) else {
            continue;
        };
        if concrete.contains(now) {
            return concrete.state;
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Los_Angeles;
    use chrono_tz::UTC;

    fn window(on: &str, off: &str) -> TimeWindow {
        TimeWindow {
            cycle_on: crate::time::parse_time_of_day(on).unwrap(),
            cycle_off: crate::time::parse_time_of_day(off).unwrap(),
        }
    }

    fn at_utc(h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap().timestamp()
    }

    #[test]
    fn should_return_on_inside_the_window() {
        let windows = [window("15:00:00", "15:15:00")];
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(15, 5, 0)),
            OutletState::On
        );
    }

    #[test]
    fn should_return_default_outside_the_window() {
        let windows = [window("15:00:00", "15:15:00")];
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(15, 20, 0)),
            OutletState::Off
        );
    }

    #[test]
    fn should_include_start_and_exclude_end() {
        let windows = [window("15:00:00", "15:15:00")];
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(15, 0, 0)),
            OutletState::On
        );
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(15, 15, 0)),
            OutletState::Off
        );
    }

    #[test]
    fn should_check_windows_in_declared_order() {
        let windows = [
            window("08:00:00", "09:00:00"),
            window("15:00:00", "15:15:00"),
        ];
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(8, 30, 0)),
            OutletState::On
        );
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(15, 10, 0)),
            OutletState::On
        );
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(12, 0, 0)),
            OutletState::Off
        );
    }

    #[test]
    fn should_evaluate_in_the_device_timezone() {
        // 22:05 UTC on 2024-06-01 is 15:05 in Los Angeles.
        let windows = [window("15:00:00", "15:15:00")];
        assert_eq!(
            desired_state(&windows, OutletState::Off, Los_Angeles, at_utc(22, 5, 0)),
            OutletState::On
        );
        assert_eq!(
            desired_state(&windows, OutletState::Off, UTC, at_utc(22, 5, 0)),
            OutletState::Off
        );
    }

    #[test]
    fn should_return_default_when_no_windows_declared() {
        assert_eq!(
            desired_state(&[], OutletState::On, UTC, at_utc(12, 0, 0)),
            OutletState::On
        );
    }
}
