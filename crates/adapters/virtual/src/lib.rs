//! # plughub-adapter-virtual
//!
//! Virtual/demo strip adapter — a simulated multi-outlet strip for tests
//! and demonstration wiring. Relay state lives in process memory; the
//! device can be made unreachable on demand to exercise actuator-failure
//! paths.
//!
//! ## Dependency rule
//!
//! Depends on `plughub-app` (port traits) and `plughub-domain` only.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use plughub_app::ports::StripClient;
use plughub_domain::error::ActuatorError;
use plughub_domain::state::OutletState;

/// Simulated strip holding its relay states in memory.
pub struct VirtualStrip {
    name: String,
    states: Mutex<HashMap<String, OutletState>>,
    commands: Mutex<Vec<(String, OutletState)>>,
    unreachable: Mutex<bool>,
}

impl VirtualStrip {
    /// Create a strip with the given outlets, all starting off.
    #[must_use]
    pub fn new(name: &str, outlets: &[&str]) -> Self {
        Self::with_states(
            name,
            outlets.iter().map(|outlet| (*outlet, OutletState::Off)),
        )
    }

    /// Create a strip with explicit initial states.
    pub fn with_states<'a>(
        name: &str,
        states: impl IntoIterator<Item = (&'a str, OutletState)>,
    ) -> Self {
        Self {
            name: name.to_string(),
            states: Mutex::new(
                states
                    .into_iter()
                    .map(|(outlet, state)| (outlet.to_string(), state))
                    .collect(),
            ),
            commands: Mutex::new(Vec::new()),
            unreachable: Mutex::new(false),
        }
    }

    /// Make every subsequent read and command fail (device offline).
    pub fn set_unreachable(&self, value: bool) {
        *self
            .unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Current simulated state of one outlet.
    #[must_use]
    pub fn state(&self, outlet: &str) -> Option<OutletState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(outlet)
            .copied()
    }

    /// Every command accepted so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<(String, OutletState)> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_reachable(&self) -> Result<(), ActuatorError> {
        if *self
            .unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(ActuatorError::Timeout {
                device: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl StripClient for VirtualStrip {
    fn read_states(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, OutletState>, ActuatorError>> + Send {
        let result = self.check_reachable().map(|()| {
            self.states
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        });
        async move { result }
    }

    fn set_state(
        &self,
        outlet: &str,
        state: OutletState,
    ) -> impl Future<Output = Result<(), ActuatorError>> + Send {
        let result = self.check_reachable().and_then(|()| {
            let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
            if !states.contains_key(outlet) {
                return Err(ActuatorError::MissingOutlet {
                    device: self.name.clone(),
                    outlet: outlet.to_string(),
                });
            }
            states.insert(outlet.to_string(), state);
            self.commands
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((outlet.to_string(), state));
            Ok(())
        });
        async move { result }
    }
}
