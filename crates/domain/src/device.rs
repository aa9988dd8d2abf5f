//! Device — a multi-outlet power strip and its raw configuration.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, UnknownOutletError};
use crate::outlet::Outlet;
use crate::schedule::RawOutlet;
use crate::time::Timestamp;

/// A validated strip: address, timezone, and its configured outlets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub host: String,
    pub timezone: Tz,
    pub outlets: Vec<Outlet>,
}

impl Device {
    /// Look up an outlet by name.
    #[must_use]
    pub fn outlet(&self, name: &str) -> Option<&Outlet> {
        self.outlets.iter().find(|o| o.name == name)
    }

    /// Look up an outlet by name, or fail with its identity.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownOutletError`] when `name` is not configured on this
    /// device.
    pub fn outlet_or_err(&self, name: &str) -> Result<&Outlet, UnknownOutletError> {
        self.outlet(name).ok_or_else(|| UnknownOutletError {
            device: self.name.clone(),
            outlet: name.to_string(),
        })
    }
}

/// Raw per-device configuration as it appears in the config file.
///
/// Outlets are keyed by their alias on the strip; a `BTreeMap` keeps
/// validation order (and therefore error reporting) deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDevice {
    pub name: String,
    pub host: String,
    pub timezone: Option<String>,
    #[serde(default)]
    pub outlets: BTreeMap<String, RawOutlet>,
}

impl RawDevice {
    /// Validate this raw fragment into a typed [`Device`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, naming the device and the
    /// offending outlet.
    pub fn validate(&self, now: Timestamp) -> Result<Device, ConfigError> {
        let tz_raw = self
            .timezone
            .as_deref()
            .ok_or_else(|| ConfigError::MissingTimezone {
                device: self.name.clone(),
            })?;
        let timezone: Tz = tz_raw.parse().map_err(|_| ConfigError::InvalidTimezone {
            device: self.name.clone(),
            value: tz_raw.to_string(),
        })?;
        if self.outlets.is_empty() {
            return Err(ConfigError::NoOutlets {
                device: self.name.clone(),
            });
        }
        let outlets = self
            .outlets
            .iter()
            .map(|(outlet, raw)| raw.validate(&self.name, outlet, timezone, now))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Device {
            name: self.name.clone(),
            host: self.host.clone(),
            timezone,
            outlets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OutletState;

    fn raw_device() -> RawDevice {
        RawDevice {
            name: "GardenStrip".to_string(),
            host: "192.168.0.156".to_string(),
            timezone: Some("America/Los_Angeles".to_string()),
            outlets: [(
                "TowerGarden".to_string(),
                RawOutlet {
                    default: Some("off".to_string()),
                    schedule: None,
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn should_validate_device_with_known_timezone() {
        let device = raw_device().validate(0).unwrap();
        assert_eq!(device.name, "GardenStrip");
        assert_eq!(device.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(device.outlets.len(), 1);
        assert_eq!(device.outlets[0].default, OutletState::Off);
    }

    #[test]
    fn should_reject_missing_timezone() {
        let mut raw = raw_device();
        raw.timezone = None;
        let err = raw.validate(0).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTimezone { .. }));
    }

    #[test]
    fn should_reject_unknown_timezone() {
        let mut raw = raw_device();
        raw.timezone = Some("America/Atlantis".to_string());
        let err = raw.validate(0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimezone { .. }));
    }

    #[test]
    fn should_reject_device_without_outlets() {
        let mut raw = raw_device();
        raw.outlets.clear();
        let err = raw.validate(0).unwrap_err();
        assert!(matches!(err, ConfigError::NoOutlets { .. }));
    }

    #[test]
    fn should_look_up_outlets_by_name() {
        let device = raw_device().validate(0).unwrap();
        assert!(device.outlet("TowerGarden").is_some());
        assert!(device.outlet("Nope").is_none());

        let err = device.outlet_or_err("Nope").unwrap_err();
        assert_eq!(err.device, "GardenStrip");
        assert_eq!(err.outlet, "Nope");
    }
}
