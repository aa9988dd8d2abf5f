//! Tracker records — persisted state for repeating-cycle schedules.

use serde::{Deserialize, Serialize};

use crate::state::OutletState;
use crate::time::Timestamp;

/// Key identifying one outlet across all devices: `device/outlet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutletKey(String);

impl OutletKey {
    #[must_use]
    pub fn new(device: &str, outlet: &str) -> Self {
        Self(format!("{device}/{outlet}"))
    }

    /// Wrap a key string previously produced by [`OutletKey::new`]
    /// (e.g. read back from the durable store).
    #[must_use]
    pub fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OutletKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single pending future flip for a repeating-schedule outlet.
///
/// At most one live record exists per outlet key. `resulting_state` is the
/// state the outlet will be put into once `now >= scheduled_at`; until then
/// the state in effect is its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub scheduled_at: Timestamp,
    pub resulting_state: OutletState,
}

/// An audited state transition issued by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub outlet_key: OutletKey,
    pub resulting_state: OutletState,
    pub recorded_at: Timestamp,
}
