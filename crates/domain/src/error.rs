//! Error types used across the workspace.
//!
//! Each layer defines a typed error and converts into [`PlugHubError`] via
//! `#[from]`; adapters box their backend errors into
//! [`PlugHubError::Storage`] so the domain stays free of driver types.

/// Top-level error aggregating every failure class in the system.
#[derive(Debug, thiserror::Error)]
pub enum PlugHubError {
    /// Malformed configuration. Fatal at load, before any device is touched.
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// An operation referenced a device absent from configuration.
    #[error("unknown device")]
    UnknownDevice(#[from] UnknownDeviceError),

    /// An operation referenced an outlet absent from configuration.
    #[error("unknown outlet")]
    UnknownOutlet(#[from] UnknownOutletError),

    /// Transient failure communicating with a strip.
    #[error("actuator error")]
    Actuator(#[from] ActuatorError),

    /// A persisted tracker record did not hold what it should.
    #[error("tracker corruption")]
    Tracker(#[from] TrackerCorruption),

    /// Backend failure in the durable store.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A device name that is not present in the loaded configuration.
#[derive(Debug, thiserror::Error)]
#[error("device {device} is not configured")]
pub struct UnknownDeviceError {
    pub device: String,
}

/// An outlet name that is not present in the loaded configuration.
#[derive(Debug, thiserror::Error)]
#[error("outlet {device}/{outlet} is not configured")]
pub struct UnknownOutletError {
    pub device: String,
    pub outlet: String,
}

/// Failures talking to the physical (or simulated) strip.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    /// The command did not complete within the configured bound.
    #[error("timed out waiting for {device}")]
    Timeout { device: String },

    /// The transport failed before a response arrived.
    #[error("failed to reach {device}")]
    Io {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// The device answered with something other than the expected shape.
    #[error("unexpected response from {device}: {detail}")]
    Protocol { device: String, detail: String },

    /// The strip's own report did not include the addressed outlet.
    #[error("{device} did not report outlet {outlet}")]
    MissingOutlet { device: String, outlet: String },
}

/// A persisted transition record missing or mangling expected fields.
#[derive(Debug, thiserror::Error)]
#[error("tracker record for {key} is corrupt: {detail}")]
pub struct TrackerCorruption {
    pub key: String,
    pub detail: String,
}

/// Configuration validation failures.
///
/// Every variant names the offending device (and outlet where one exists)
/// and echoes the rejected fragment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("device {device}: outlet {outlet}: default setting is missing")]
    MissingDefault { device: String, outlet: String },

    #[error("device {device}: outlet {outlet}: default {value:?} is not valid, expected \"on\" or \"off\"")]
    InvalidDefault {
        device: String,
        outlet: String,
        value: String,
    },

    #[error("device {device}: outlet {outlet}: schedule is missing its type")]
    MissingScheduleType { device: String, outlet: String },

    #[error("device {device}: outlet {outlet}: schedule type {value:?} is not supported, expected `daily` or `repeating`")]
    UnsupportedScheduleType {
        device: String,
        outlet: String,
        value: String,
    },

    #[error("device {device}: outlet {outlet}: daily schedule has no time windows")]
    EmptyWindows { device: String, outlet: String },

    #[error("device {device}: outlet {outlet}: window is missing {field}: {window}")]
    MissingWindowField {
        device: String,
        outlet: String,
        field: &'static str,
        window: String,
    },

    #[error("device {device}: outlet {outlet}: {field} {value:?} is not a valid `HH:MM:SS` time of day")]
    InvalidTimeOfDay {
        device: String,
        outlet: String,
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("device {device}: outlet {outlet}: cycle_on must precede cycle_off within the same day: {window}")]
    WindowOrder {
        device: String,
        outlet: String,
        window: String,
    },

    #[error("device {device}: outlet {outlet}: window {window} requests the outlet's default state and would never take effect")]
    NoOpWindow {
        device: String,
        outlet: String,
        window: String,
    },

    #[error("device {device}: outlet {outlet}: window {second} overlaps window {first}")]
    OverlappingWindows {
        device: String,
        outlet: String,
        first: String,
        second: String,
    },

    #[error("device {device}: outlet {outlet}: repeating schedule is missing {field}")]
    MissingDuration {
        device: String,
        outlet: String,
        field: &'static str,
    },

    #[error("device {device}: outlet {outlet}: {field} {value:?} is not a valid `HH:MM:SS` duration")]
    InvalidDuration {
        device: String,
        outlet: String,
        field: &'static str,
        value: String,
    },

    #[error("device {device}: outlet {outlet}: {field} must be a non-zero duration")]
    ZeroDuration {
        device: String,
        outlet: String,
        field: &'static str,
    },

    #[error("device {device} is missing its timezone")]
    MissingTimezone { device: String },

    #[error("device {device}: timezone {value:?} is not a known IANA timezone")]
    InvalidTimezone { device: String, value: String },

    #[error("device {device} has no outlets configured")]
    NoOutlets { device: String },
}
