//! Shared application state for axum handlers.

use std::collections::HashMap;
use std::sync::Arc;

use plughub_app::ports::{AuditLog, StripClient, TrackerStore};
use plughub_app::reconciler::Reconciler;
use plughub_domain::error::UnknownDeviceError;

/// Application state shared across all axum handlers.
///
/// Generic over the strip, tracker, and audit port types to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` wrappers are
/// cloned.
pub struct AppState<S, T, A> {
    /// One reconciler per configured device, keyed by device name.
    pub reconcilers: Arc<HashMap<String, Reconciler<S, T, A>>>,
    /// Audit log handle for read queries.
    pub audit: Arc<A>,
}

impl<S, T, A> Clone for AppState<S, T, A> {
    fn clone(&self) -> Self {
        Self {
            reconcilers: Arc::clone(&self.reconcilers),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl<S, T, A> AppState<S, T, A>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    /// Create a new application state.
    pub fn new(reconcilers: HashMap<String, Reconciler<S, T, A>>, audit: A) -> Self {
        Self {
            reconcilers: Arc::new(reconcilers),
            audit: Arc::new(audit),
        }
    }

    /// Create a new application state from pre-wrapped `Arc`s.
    ///
    /// Use this when the reconcilers are shared with a background pass loop
    /// before constructing the HTTP state.
    pub fn from_arcs(reconcilers: Arc<HashMap<String, Reconciler<S, T, A>>>, audit: Arc<A>) -> Self {
        Self { reconcilers, audit }
    }

    /// Look up the reconciler owning `device`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownDeviceError`] for devices absent from configuration.
    pub fn reconciler(&self, device: &str) -> Result<&Reconciler<S, T, A>, UnknownDeviceError> {
        self.reconcilers.get(device).ok_or_else(|| UnknownDeviceError {
            device: device.to_string(),
        })
    }
}
