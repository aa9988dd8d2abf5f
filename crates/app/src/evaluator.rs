//! Desired-state evaluation — the single canonical evaluator.
//!
//! Daily schedules evaluate as a pure function of `(now, config)`. Repeating
//! schedules consult the tracker store and advance it when a flip is due;
//! advancement is a compare-and-swap so that concurrent passes over the same
//! outlet can never both observe a due flip and double-advance the cycle.

use plughub_domain::device::Device;
use plughub_domain::error::{PlugHubError, TrackerCorruption};
use plughub_domain::outlet::Outlet;
use plughub_domain::schedule::{Schedule, desired_state};
use plughub_domain::state::OutletState;
use plughub_domain::time::Timestamp;
use plughub_domain::tracker::{OutletKey, TransitionRecord};

use crate::ports::TrackerStore;

/// Evaluates an outlet's schedule to its desired state at an instant.
pub struct Evaluator<T> {
    tracker: T,
}

impl<T: TrackerStore> Evaluator<T> {
    /// Create an evaluator backed by the given tracker store.
    pub fn new(tracker: T) -> Self {
        Self { tracker }
    }

    /// Compute the desired state of `outlet` on `device` at `now`.
    ///
    /// Never fails: when the tracker store is unavailable or its record is
    /// corrupt, the outlet's configured default is returned for this pass
    /// and the error is logged.
    pub async fn evaluate(&self, device: &Device, outlet: &Outlet, now: Timestamp) -> OutletState {
        match &outlet.schedule {
            Schedule::None => outlet.default,
            Schedule::Daily { times } => desired_state(times, outlet.default, device.timezone, now),
            Schedule::Repeating { cycle_on, cycle_off } => {
                let key = outlet.key(&device.name);
                match self.advance_cycle(&key, *cycle_on, *cycle_off, now).await {
                    Ok(state) => state,
                    Err(err) => {
                        tracing::error!(
                            key = %key,
                            error = %err,
                            "tracker unavailable, falling back to configured default"
                        );
                        outlet.default
                    }
                }
            }
        }
    }

    /// Run the repeating-cycle state machine for one outlet.
    ///
    /// First observation: desired ON, and the off-flip is scheduled
    /// `cycle_on` seconds out. Before the deadline: the state in effect is
    /// the inverse of the pending `resulting_state`. At or past the
    /// deadline: the pending state takes effect and the record is swapped
    /// for the next flip. Lost races re-read and adopt the winner's record.
    async fn advance_cycle(
        &self,
        key: &OutletKey,
        cycle_on: i64,
        cycle_off: i64,
        now: Timestamp,
    ) -> Result<OutletState, PlugHubError> {
        for _ in 0..2 {
            let Some(record) = self.tracker.get(key).await? else {
                let first = TransitionRecord {
                    scheduled_at: now + cycle_on,
                    resulting_state: OutletState::Off,
                };
                if self.tracker.insert_new(key, first).await? {
                    tracing::debug!(key = %key, scheduled_at = first.scheduled_at, "cycle anchored");
                    return Ok(OutletState::On);
                }
                // Lost the insert race; re-read and adopt.
                continue;
            };

            if now < record.scheduled_at {
                return Ok(!record.resulting_state);
            }

            let hold = if record.resulting_state.is_on() {
                cycle_on
            } else {
                cycle_off
            };
            let next = TransitionRecord {
                scheduled_at: now + hold,
                resulting_state: !record.resulting_state,
            };
            if self.tracker.replace(key, &record, next).await? {
                tracing::info!(
                    key = %key,
                    state = %record.resulting_state,
                    next_flip = next.scheduled_at,
                    "cycle advanced"
                );
                return Ok(record.resulting_state);
            }
            // A concurrent pass advanced the cycle; re-read and adopt.
        }

        // Two lost races in a row: another writer owns the advancement.
        // Report the state its record implies without touching the store.
        match self.tracker.get(key).await? {
            Some(record) => Ok(!record.resulting_state),
            None => Err(TrackerCorruption {
                key: key.to_string(),
                detail: "record vanished during evaluation".to_string(),
            }
            .into()),
        }
    }
}
