//! Outlet — an individually controllable socket on a strip.

use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;
use crate::state::OutletState;
use crate::tracker::OutletKey;

/// A validated outlet: identity, default state, and its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlet {
    pub name: String,
    pub default: OutletState,
    pub schedule: Schedule,
}

impl Outlet {
    /// Tracker/audit key for this outlet under `device`.
    #[must_use]
    pub fn key(&self, device: &str) -> OutletKey {
        OutletKey::new(device, &self.name)
    }
}
