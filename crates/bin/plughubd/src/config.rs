//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `plughub.toml` in the working directory. Every field except the
//! device list has a sensible default. Environment variables take precedence
//! over file values. Device sections are string-typed raw fragments; they go
//! through the domain validator before any strip is contacted.

use std::time::Duration;

use serde::Deserialize;

use plughub_domain::device::{Device, RawDevice};
use plughub_domain::time::Timestamp;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Reconciliation loop settings.
    pub reconcile: ReconcileConfig,
    /// Configured strips, validated at load.
    pub devices: Vec<RawDevice>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Reconciliation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Seconds between periodic passes.
    pub interval_secs: u64,
    /// Bound on each strip command, in seconds.
    pub command_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `plughub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// semantic check fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("plughub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PLUGHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PLUGHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("PLUGHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("PLUGHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("PLUGHUB_RECONCILE_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.reconcile.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("PLUGHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.reconcile.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "reconcile interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate every raw device section into typed [`Device`]s.
    ///
    /// `now` anchors the daily-window conflict check.
    ///
    /// # Errors
    ///
    /// Returns the first schedule/device validation failure, naming the
    /// device and outlet.
    pub fn validated_devices(&self, now: Timestamp) -> Result<Vec<Device>, ConfigError> {
        Ok(self
            .devices
            .iter()
            .map(|raw| raw.validate(now))
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Interval between periodic reconciliation passes.
    #[must_use]
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile.interval_secs)
    }

    /// Bound applied to each strip command.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile.command_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:plughub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "plughubd=info,plughub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            command_timeout_secs: 5,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Device/schedule validation failure.
    #[error("invalid device configuration")]
    Devices(#[from] plughub_domain::error::ConfigError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
        [server]
        host = '127.0.0.1'
        port = 9090

        [database]
        url = 'sqlite:test.db'

        [logging]
        filter = 'debug'

        [reconcile]
        interval_secs = 30
        command_timeout_secs = 2

        [[devices]]
        name = 'GardenStrip'
        host = '192.168.0.156'
        timezone = 'America/Los_Angeles'

        [devices.outlets.TowerGarden]
        default = 'off'

        [devices.outlets.TowerGarden.schedule]
        type = 'repeating'
        cycle_on = '00:15:00'
        cycle_off = '00:15:00'

        [devices.outlets.Outdoor_Left]
        default = 'off'

        [devices.outlets.Outdoor_Left.schedule]
        type = 'daily'
        times = [{ cycle_on = '15:00:00', cycle_off = '15:15:00' }]
    "#;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.url, "sqlite:plughub.db?mode=rwc");
        assert_eq!(config.reconcile.interval_secs, 60);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn should_parse_full_toml() {
        let config: Config = toml::from_str(FULL_TOML).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.reconcile.interval_secs, 30);
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].name, "GardenStrip");
        assert_eq!(config.devices[0].outlets.len(), 2);
    }

    #[test]
    fn should_validate_devices_into_typed_form() {
        let config: Config = toml::from_str(FULL_TOML).unwrap();
        let devices = config.validated_devices(0).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(devices[0].outlets.len(), 2);
    }

    #[test]
    fn should_reject_invalid_schedule_at_load() {
        let toml = r"
            [[devices]]
            name = 'GardenStrip'
            host = '192.168.0.156'
            timezone = 'UTC'

            [devices.outlets.TowerGarden]
            default = 'off'

            [devices.outlets.TowerGarden.schedule]
            type = 'daily'
            times = [{ cycle_on = '23:00:00', cycle_off = '01:00:00' }]
        ";
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validated_devices(0).unwrap_err();
        let ConfigError::Devices(inner) = err else {
            panic!("expected a device validation error, got {err:?}");
        };
        assert!(
            inner.to_string().contains("TowerGarden"),
            "error should name the outlet"
        );
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_reconcile_interval() {
        let mut config = Config::default();
        config.reconcile.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
