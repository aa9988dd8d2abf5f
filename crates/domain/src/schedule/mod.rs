//! Schedules — declarative per-outlet automation rules.
//!
//! A schedule is one of three variants: no schedule (the outlet simply holds
//! its default), fixed daily time windows, or a self-perpetuating repeating
//! cycle. Raw configuration is string-typed ([`RawOutlet`], [`RawSchedule`],
//! [`RawTimeWindow`]) and is validated exactly once, at load, into the typed
//! form; nothing downstream ever re-parses a literal.

mod conflict;
mod daily;
mod window;

pub use conflict::{WindowConflict, find_conflict, is_valid};
pub use daily::desired_state;
pub use window::{ConcreteWindow, TimeWindow, next_local_midnight};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::outlet::Outlet;
use crate::state::OutletState;
use crate::time::{Timestamp, parse_duration, parse_time_of_day};

/// Validated schedule for one outlet. Exactly one variant is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schedule {
    /// No schedule — the outlet holds its configured default.
    #[default]
    None,
    /// Fixed daily activation windows, evaluated in declared order.
    Daily { times: Vec<TimeWindow> },
    /// Self-perpetuating alternation: ON for `cycle_on` seconds, OFF for
    /// `cycle_off` seconds, anchored to first observation.
    Repeating { cycle_on: i64, cycle_off: i64 },
}

impl Schedule {
    /// Variant name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily { .. } => "daily",
            Self::Repeating { .. } => "repeating",
        }
    }
}

/// Raw per-outlet configuration as it appears in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutlet {
    pub default: Option<String>,
    pub schedule: Option<RawSchedule>,
}

/// Raw schedule fragment; `type` selects the variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchedule {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub times: Option<Vec<RawTimeWindow>>,
    pub cycle_on: Option<String>,
    pub cycle_off: Option<String>,
}

/// Raw daily window fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimeWindow {
    pub cycle_on: Option<String>,
    pub cycle_off: Option<String>,
}

impl RawOutlet {
    /// Validate this raw fragment into a typed [`Outlet`].
    ///
    /// `tz` and `now` anchor the conflict check for daily windows.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming `device`/`outlet` and echoing the
    /// rejected fragment.
    pub fn validate(
        &self,
        device: &str,
        outlet: &str,
        tz: Tz,
        now: Timestamp,
    ) -> Result<Outlet, ConfigError> {
        let default_raw = self.default.as_ref().ok_or_else(|| ConfigError::MissingDefault {
            device: device.to_string(),
            outlet: outlet.to_string(),
        })?;
        let default =
            OutletState::parse(default_raw).ok_or_else(|| ConfigError::InvalidDefault {
                device: device.to_string(),
                outlet: outlet.to_string(),
                value: default_raw.clone(),
            })?;
        let schedule = match &self.schedule {
            None => Schedule::None,
            Some(raw) => raw.validate(device, outlet, default, tz, now)?,
        };
        Ok(Outlet {
            name: outlet.to_string(),
            default,
            schedule,
        })
    }
}

impl RawSchedule {
    fn validate(
        &self,
        device: &str,
        outlet: &str,
        default: OutletState,
        tz: Tz,
        now: Timestamp,
    ) -> Result<Schedule, ConfigError> {
        match self.kind.as_deref() {
            None => Err(ConfigError::MissingScheduleType {
                device: device.to_string(),
                outlet: outlet.to_string(),
            }),
            Some("daily") => self.validate_daily(device, outlet, default, tz, now),
            Some("repeating") => self.validate_repeating(device, outlet),
            Some(other) => Err(ConfigError::UnsupportedScheduleType {
                device: device.to_string(),
                outlet: outlet.to_string(),
                value: other.to_string(),
            }),
        }
    }

    fn validate_daily(
        &self,
        device: &str,
        outlet: &str,
        default: OutletState,
        tz: Tz,
        now: Timestamp,
    ) -> Result<Schedule, ConfigError> {
        let raw_times = match &self.times {
            Some(times) if !times.is_empty() => times,
            _ => {
                return Err(ConfigError::EmptyWindows {
                    device: device.to_string(),
                    outlet: outlet.to_string(),
                });
            }
        };

        let mut times = Vec::with_capacity(raw_times.len());
        let mut accepted = Vec::with_capacity(raw_times.len());
        let mut sources: Vec<TimeWindow> = Vec::with_capacity(raw_times.len());
        for raw in raw_times {
            let window = raw.validate(device, outlet)?;
            if window.spans_midnight() {
                return Err(ConfigError::WindowOrder {
                    device: device.to_string(),
                    outlet: outlet.to_string(),
                    window: window.to_string(),
                });
            }
            // A window erased by a DST gap on the load day cannot be
            // projected for the conflict check; it is structurally valid
            // and re-materializes on evaluation days where it exists.
            if let Some(concrete) = window.materialize(tz, now) {
                match find_conflict(&accepted, &concrete, default, tz, now) {
                    Some(WindowConflict::MatchesDefault) => {
                        return Err(ConfigError::NoOpWindow {
                            device: device.to_string(),
                            outlet: outlet.to_string(),
                            window: window.to_string(),
                        });
                    }
                    Some(
                        WindowConflict::Overlaps { accepted: hit }
                        | WindowConflict::WrapsOnto { accepted: hit },
                    ) => {
                        let first = accepted
                            .iter()
                            .position(|w| *w == hit)
                            .map_or_else(String::new, |i| sources[i].to_string());
                        return Err(ConfigError::OverlappingWindows {
                            device: device.to_string(),
                            outlet: outlet.to_string(),
                            first,
                            second: window.to_string(),
                        });
                    }
                    None => {}
                }
                accepted.push(concrete);
                sources.push(window);
            }
            times.push(window);
        }
        Ok(Schedule::Daily { times })
    }

    fn validate_repeating(&self, device: &str, outlet: &str) -> Result<Schedule, ConfigError> {
        let cycle_on = parse_cycle(device, outlet, "cycle_on", self.cycle_on.as_deref())?;
        let cycle_off = parse_cycle(device, outlet, "cycle_off", self.cycle_off.as_deref())?;
        Ok(Schedule::Repeating { cycle_on, cycle_off })
    }
}

impl RawTimeWindow {
    fn validate(&self, device: &str, outlet: &str) -> Result<TimeWindow, ConfigError> {
        let on_raw = self.cycle_on.as_ref().ok_or_else(|| ConfigError::MissingWindowField {
            device: device.to_string(),
            outlet: outlet.to_string(),
            field: "cycle_on",
            window: format!("{self:?}"),
        })?;
        let off_raw = self.cycle_off.as_ref().ok_or_else(|| ConfigError::MissingWindowField {
            device: device.to_string(),
            outlet: outlet.to_string(),
            field: "cycle_off",
            window: format!("{self:?}"),
        })?;
        let cycle_on = parse_time_of_day(on_raw).map_err(|source| ConfigError::InvalidTimeOfDay {
            device: device.to_string(),
            outlet: outlet.to_string(),
            field: "cycle_on",
            value: on_raw.clone(),
            source,
        })?;
        let cycle_off =
            parse_time_of_day(off_raw).map_err(|source| ConfigError::InvalidTimeOfDay {
                device: device.to_string(),
                outlet: outlet.to_string(),
                field: "cycle_off",
                value: off_raw.clone(),
                source,
            })?;
        Ok(TimeWindow { cycle_on, cycle_off })
    }
}

fn parse_cycle(
    device: &str,
    outlet: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<i64, ConfigError> {
    let raw = value.ok_or_else(|| ConfigError::MissingDuration {
        device: device.to_string(),
        outlet: outlet.to_string(),
        field,
    })?;
    let seconds = parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration {
        device: device.to_string(),
        outlet: outlet.to_string(),
        field,
        value: raw.to_string(),
    })?;
    if seconds == 0 {
        return Err(ConfigError::ZeroDuration {
            device: device.to_string(),
            outlet: outlet.to_string(),
            field,
        });
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::UTC;

    fn noon() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap().timestamp()
    }

    fn raw_window(on: &str, off: &str) -> RawTimeWindow {
        RawTimeWindow {
            cycle_on: Some(on.to_string()),
            cycle_off: Some(off.to_string()),
        }
    }

    fn daily(times: Vec<RawTimeWindow>) -> RawOutlet {
        RawOutlet {
            default: Some("off".to_string()),
            schedule: Some(RawSchedule {
                kind: Some("daily".to_string()),
                times: Some(times),
                ..RawSchedule::default()
            }),
        }
    }

    fn repeating(cycle_on: &str, cycle_off: &str) -> RawOutlet {
        RawOutlet {
            default: Some("off".to_string()),
            schedule: Some(RawSchedule {
                kind: Some("repeating".to_string()),
                cycle_on: Some(cycle_on.to_string()),
                cycle_off: Some(cycle_off.to_string()),
                ..RawSchedule::default()
            }),
        }
    }

    #[test]
    fn should_validate_outlet_without_schedule() {
        let raw = RawOutlet {
            default: Some("on".to_string()),
            schedule: None,
        };
        let outlet = raw.validate("Strip", "Lamp", UTC, noon()).unwrap();
        assert_eq!(outlet.default, OutletState::On);
        assert_eq!(outlet.schedule, Schedule::None);
    }

    #[test]
    fn should_reject_missing_default() {
        let raw = RawOutlet::default();
        let err = raw.validate("Strip", "Lamp", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDefault { .. }));
    }

    #[test]
    fn should_reject_unparseable_default() {
        let raw = RawOutlet {
            default: Some("maybe".to_string()),
            schedule: None,
        };
        let err = raw.validate("Strip", "Lamp", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefault { .. }));
    }

    #[test]
    fn should_reject_unsupported_schedule_type() {
        let raw = RawOutlet {
            default: Some("off".to_string()),
            schedule: Some(RawSchedule {
                kind: Some("weekly".to_string()),
                ..RawSchedule::default()
            }),
        };
        let err = raw.validate("Strip", "Lamp", UTC, noon()).unwrap_err();
        assert!(
            matches!(err, ConfigError::UnsupportedScheduleType { ref value, .. } if value == "weekly")
        );
    }

    #[test]
    fn should_reject_schedule_without_type() {
        let raw = RawOutlet {
            default: Some("off".to_string()),
            schedule: Some(RawSchedule::default()),
        };
        let err = raw.validate("Strip", "Lamp", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingScheduleType { .. }));
    }

    #[test]
    fn should_validate_daily_schedule() {
        let raw = daily(vec![raw_window("15:00:00", "15:15:00")]);
        let outlet = raw.validate("Strip", "Garden", UTC, noon()).unwrap();
        let Schedule::Daily { times } = outlet.schedule else {
            panic!("expected a daily schedule");
        };
        assert_eq!(times.len(), 1);
        assert_eq!(times[0].to_string(), "15:00:00..15:15:00");
    }

    #[test]
    fn should_reject_daily_schedule_without_windows() {
        let raw = daily(vec![]);
        let err = raw.validate("Strip", "Garden", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyWindows { .. }));
    }

    #[test]
    fn should_reject_window_missing_cycle_off() {
        let raw = daily(vec![RawTimeWindow {
            cycle_on: Some("15:00:00".to_string()),
            cycle_off: None,
        }]);
        let err = raw.validate("Strip", "Garden", UTC, noon()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingWindowField { field: "cycle_off", .. }
        ));
    }

    #[test]
    fn should_reject_unparseable_window_time() {
        let raw = daily(vec![raw_window("3pm", "15:15:00")]);
        let err = raw.validate("Strip", "Garden", UTC, noon()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTimeOfDay { field: "cycle_on", .. }
        ));
    }

    #[test]
    fn should_reject_midnight_spanning_window() {
        let raw = daily(vec![raw_window("23:00:00", "01:00:00")]);
        let err = raw.validate("Strip", "Garden", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::WindowOrder { .. }));
    }

    #[test]
    fn should_reject_overlapping_windows() {
        let raw = daily(vec![
            raw_window("15:00:00", "16:00:00"),
            raw_window("15:30:00", "16:30:00"),
        ]);
        let err = raw.validate("Strip", "Garden", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingWindows { .. }));
    }

    #[test]
    fn should_accept_disjoint_windows() {
        let raw = daily(vec![
            raw_window("08:00:00", "09:00:00"),
            raw_window("15:00:00", "15:15:00"),
        ]);
        assert!(raw.validate("Strip", "Garden", UTC, noon()).is_ok());
    }

    #[test]
    fn should_reject_daily_windows_when_default_is_on() {
        let raw = RawOutlet {
            default: Some("on".to_string()),
            schedule: Some(RawSchedule {
                kind: Some("daily".to_string()),
                times: Some(vec![raw_window("15:00:00", "15:15:00")]),
                ..RawSchedule::default()
            }),
        };
        let err = raw.validate("Strip", "Garden", UTC, noon()).unwrap_err();
        assert!(matches!(err, ConfigError::NoOpWindow { .. }));
    }

    #[test]
    fn should_validate_repeating_schedule() {
        let raw = repeating("00:15:00", "00:45:00");
        let outlet = raw.validate("Strip", "Tower", UTC, noon()).unwrap();
        assert_eq!(
            outlet.schedule,
            Schedule::Repeating {
                cycle_on: 900,
                cycle_off: 2700
            }
        );
    }

    #[test]
    fn should_reject_repeating_schedule_missing_cycle_off() {
        let raw = RawOutlet {
            default: Some("off".to_string()),
            schedule: Some(RawSchedule {
                kind: Some("repeating".to_string()),
                cycle_on: Some("00:15:00".to_string()),
                ..RawSchedule::default()
            }),
        };
        let err = raw.validate("Strip", "Tower", UTC, noon()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingDuration { field: "cycle_off", .. }
        ));
    }

    #[test]
    fn should_reject_unparseable_cycle_duration() {
        let raw = repeating("15 minutes", "00:15:00");
        let err = raw.validate("Strip", "Tower", UTC, noon()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration { field: "cycle_on", .. }
        ));
    }

    #[test]
    fn should_reject_zero_cycle_duration() {
        let raw = repeating("00:00:00", "00:15:00");
        let err = raw.validate("Strip", "Tower", UTC, noon()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroDuration { field: "cycle_on", .. }
        ));
    }

    #[test]
    fn should_roundtrip_schedule_through_serde_json() {
        let schedule = Schedule::Repeating {
            cycle_on: 900,
            cycle_off: 900,
        };
        let json = serde_json::to_string(&schedule).unwrap();
        assert!(json.contains("\"repeating\""));
        let parsed: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schedule);
    }

    #[test]
    fn should_report_schedule_kind() {
        assert_eq!(Schedule::None.kind(), "none");
        assert_eq!(
            Schedule::Daily { times: vec![] }.kind(),
            "daily"
        );
        assert_eq!(
            Schedule::Repeating {
                cycle_on: 1,
                cycle_off: 1
            }
            .kind(),
            "repeating"
        );
    }
}
