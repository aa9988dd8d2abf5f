//! Strip port — the device capability consumed by the reconciler.

use std::collections::HashMap;
use std::future::Future;

use plughub_domain::error::ActuatorError;
use plughub_domain::state::OutletState;

/// Access to one physical (or simulated) multi-outlet strip.
///
/// Implementations live in adapter crates (e.g. `adapter_kasa`,
/// `adapter_virtual`). Commands are idempotent by policy — setting an
/// already-on outlet to on is safe — and must be bounded in time: an
/// implementation either confirms the outcome or fails within its timeout.
pub trait StripClient: Send + Sync {
    /// Read a fresh snapshot of every outlet the strip reports,
    /// keyed by outlet alias. Never served from a cache.
    fn read_states(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, OutletState>, ActuatorError>> + Send;

    /// Drive one outlet to the given state.
    fn set_state(
        &self,
        outlet: &str,
        state: OutletState,
    ) -> impl Future<Output = Result<(), ActuatorError>> + Send;
}
