//! Conflict detection over concrete windows.
//!
//! Used at validation time to guarantee that an outlet's accepted windows
//! are pairwise non-overlapping, including the case where a window's end,
//! carried past the next local midnight, would land back inside an earlier
//! window on the following day.

use chrono_tz::Tz;

use crate::schedule::window::{ConcreteWindow, next_local_midnight};
use crate::state::OutletState;
use crate::time::{SECS_PER_DAY, Timestamp};

/// The first rule a candidate window tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowConflict {
    /// The candidate requests the outlet's default state; it would never
    /// change anything.
    MatchesDefault,
    /// The candidate's start or end falls inside an accepted window.
    Overlaps { accepted: ConcreteWindow },
    /// The candidate runs past local midnight and, reinterpreted for the
    /// following day, lands inside an accepted window.
    WrapsOnto { accepted: ConcreteWindow },
}

/// Check `candidate` against the windows accepted so far.
///
/// Returns the first conflict found, or `None` when the candidate may be
/// accepted. `now` anchors the local-midnight boundary used by the wrap
/// rule.
#[must_use]
pub fn find_conflict(
    accepted: &[ConcreteWindow],
    candidate: &ConcreteWindow,
    default: OutletState,
    tz: Tz,
    now: Timestamp,
) -> Option<WindowConflict> {
    if candidate.state == default {
        return Some(WindowConflict::MatchesDefault);
    }
    let midnight = next_local_midnight(tz, now)?;
    for window in accepted {
        if window.contains(candidate.start) || window.contains(candidate.end) {
            return Some(WindowConflict::Overlaps { accepted: *window });
        }
        if candidate.end >= midnight && window.contains(candidate.end - SECS_PER_DAY) {
            return Some(WindowConflict::WrapsOnto { accepted: *window });
        }
    }
    None
}

/// Boolean complement of [`find_conflict`].
#[must_use]
pub fn is_valid(
    accepted: &[ConcreteWindow],
    candidate: &ConcreteWindow,
    default: OutletState,
    tz: Tz,
    now: Timestamp,
) -> bool {
    find_conflict(accepted, candidate, default, tz, now).is_none()
}
