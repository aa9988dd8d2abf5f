//! TCP client for TP-Link Kasa smart strips.
//!
//! Each request opens a fresh connection to port 9999, sends one ciphered
//! JSON command, and reads one framed response. Strips report their outlets
//! as `children` of `get_sysinfo`; commands address a child through its
//! opaque `id` carried in a `context` envelope.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use plughub_app::ports::StripClient;
use plughub_domain::error::ActuatorError;
use plughub_domain::state::OutletState;

use crate::codec;

const KASA_PORT: u16 = 9999;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Responses larger than this are not a strip talking to us.
const MAX_RESPONSE_BYTES: u32 = 1024 * 1024;

/// Client for one Kasa multi-outlet strip.
pub struct KasaStrip {
    device: String,
    host: String,
    timeout: Duration,
}

impl KasaStrip {
    /// Create a client for the strip named `device` at `host`.
    #[must_use]
    pub fn new(device: &str, host: &str) -> Self {
        Self {
            device: device.to_string(),
            host: host.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-command timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn io_error(&self, source: std::io::Error) -> ActuatorError {
        ActuatorError::Io {
            device: self.device.clone(),
            source,
        }
    }

    fn protocol_error(&self, detail: impl Into<String>) -> ActuatorError {
        ActuatorError::Protocol {
            device: self.device.clone(),
            detail: detail.into(),
        }
    }

    /// Send one command and read its response, bounded by the timeout.
    async fn roundtrip(&self, request: &Value) -> Result<Value, ActuatorError> {
        let exchange = async {
            let mut stream = TcpStream::connect((self.host.as_str(), KASA_PORT))
                .await
                .map_err(|err| self.io_error(err))?;

            let payload = codec::encrypt(request.to_string().as_bytes());
            let len = u32::try_from(payload.len())
                .map_err(|_| self.protocol_error("request payload too large"))?;
            stream
                .write_u32(len)
                .await
                .map_err(|err| self.io_error(err))?;
            stream
                .write_all(&payload)
                .await
                .map_err(|err| self.io_error(err))?;

            let response_len = stream.read_u32().await.map_err(|err| self.io_error(err))?;
            if response_len > MAX_RESPONSE_BYTES {
                return Err(self.protocol_error(format!(
                    "response length {response_len} exceeds limit"
                )));
            }
            let mut cipher = vec![0_u8; response_len as usize];
            stream
                .read_exact(&mut cipher)
                .await
                .map_err(|err| self.io_error(err))?;

            let plain = codec::decrypt(&cipher);
            serde_json::from_slice(&plain)
                .map_err(|err| self.protocol_error(format!("invalid JSON response: {err}")))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ActuatorError::Timeout {
                device: self.device.clone(),
            })?
    }

    async fn sysinfo(&self) -> Result<Value, ActuatorError> {
        let response = self
            .roundtrip(&json!({"system": {"get_sysinfo": {}}}))
            .await?;
        response
            .pointer("/system/get_sysinfo")
            .cloned()
            .ok_or_else(|| self.protocol_error("response is missing system.get_sysinfo"))
    }
}

/// Extract `alias → state` for every child outlet in a sysinfo blob.
fn parse_child_states(
    device: &str,
    sysinfo: &Value,
) -> Result<HashMap<String, OutletState>, ActuatorError> {
    let children = sysinfo
        .get("children")
        .and_then(Value::as_array)
        .ok_or_else(|| ActuatorError::Protocol {
            device: device.to_string(),
            detail: "sysinfo has no children array".to_string(),
        })?;

    let mut states = HashMap::with_capacity(children.len());
    for child in children {
        let (Some(alias), Some(state)) = (
            child.get("alias").and_then(Value::as_str),
            child.get("state").and_then(Value::as_i64),
        ) else {
            continue;
        };
        states.insert(alias.to_string(), OutletState::from(state != 0));
    }
    Ok(states)
}

/// Find the opaque child id for an outlet alias.
fn find_child_id(device: &str, sysinfo: &Value, outlet: &str) -> Result<String, ActuatorError> {
    sysinfo
        .get("children")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|child| child.get("alias").and_then(Value::as_str) == Some(outlet))
        .and_then(|child| child.get("id").and_then(Value::as_str))
        .map(ToString::to_string)
        .ok_or_else(|| ActuatorError::MissingOutlet {
            device: device.to_string(),
            outlet: outlet.to_string(),
        })
}

impl StripClient for KasaStrip {
    async fn read_states(&self) -> Result<HashMap<String, OutletState>, ActuatorError> {
        let sysinfo = self.sysinfo().await?;
        parse_child_states(&self.device, &sysinfo)
    }

    async fn set_state(&self, outlet: &str, state: OutletState) -> Result<(), ActuatorError> {
        let sysinfo = self.sysinfo().await?;
        let child_id = find_child_id(&self.device, &sysinfo, outlet)?;

        let request = json!({
            "context": {"child_ids": [child_id]},
            "system": {"set_relay_state": {"state": i32::from(state.is_on())}},
        });
        let response = self.roundtrip(&request).await?;

        let err_code = response
            .pointer("/system/set_relay_state/err_code")
            .and_then(Value::as_i64)
            .ok_or_else(|| self.protocol_error("response is missing err_code"))?;
        if err_code != 0 {
            return Err(self.protocol_error(format!("set_relay_state failed: err_code {err_code}")));
        }
        tracing::debug!(device = %self.device, outlet, state = %state, "relay command confirmed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_sysinfo() -> Value {
        json!({
            "alias": "GardenStrip",
            "model": "HS300(US)",
            "children": [
                {"id": "8006E0B10001", "alias": "TowerGarden", "state": 1},
                {"id": "8006E0B10002", "alias": "Outdoor_Left", "state": 0},
            ],
        })
    }

    #[test]
    fn should_map_child_aliases_to_states() {
        let states = parse_child_states("GardenStrip", &strip_sysinfo()).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states["TowerGarden"], OutletState::On);
        assert_eq!(states["Outdoor_Left"], OutletState::Off);
    }

    #[test]
    fn should_reject_sysinfo_without_children() {
        let err = parse_child_states("GardenStrip", &json!({"alias": "Plug"})).unwrap_err();
        assert!(matches!(err, ActuatorError::Protocol { .. }));
    }

    #[test]
    fn should_ignore_children_missing_alias_or_state() {
        let sysinfo = json!({
            "children": [
                {"id": "01", "alias": "TowerGarden", "state": 1},
                {"id": "02", "state": 0},
                {"id": "03", "alias": "NoState"},
            ],
        });
        let states = parse_child_states("GardenStrip", &sysinfo).unwrap();
        assert_eq!(states.len(), 1);
        assert!(states.contains_key("TowerGarden"));
    }

    #[test]
    fn should_find_child_id_by_alias() {
        let id = find_child_id("GardenStrip", &strip_sysinfo(), "Outdoor_Left").unwrap();
        assert_eq!(id, "8006E0B10002");
    }

    #[test]
    fn should_report_missing_outlet_for_unknown_alias() {
        let err = find_child_id("GardenStrip", &strip_sysinfo(), "Nope").unwrap_err();
        assert!(matches!(
            err,
            ActuatorError::MissingOutlet { ref outlet, .. } if outlet == "Nope"
        ));
    }
}
