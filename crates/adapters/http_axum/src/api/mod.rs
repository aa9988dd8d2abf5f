//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod audit;
#[allow(clippy::missing_errors_doc)]
pub mod devices;

use axum::Router;
use axum::routing::{get, post};

use plughub_app::ports::{AuditLog, StripClient, TrackerStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, T, A>() -> Router<AppState<S, T, A>>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    Router::new()
        .route("/devices", get(devices::list::<S, T, A>))
        .route("/device/{device}", get(devices::snapshot::<S, T, A>))
        .route(
            "/device/{device}/outlet/{outlet}",
            get(devices::get_outlet::<S, T, A>).put(devices::set_outlet::<S, T, A>),
        )
        .route(
            "/device/{device}/reconcile",
            post(devices::reconcile::<S, T, A>),
        )
        .route("/audit", get(audit::list::<S, T, A>))
}
