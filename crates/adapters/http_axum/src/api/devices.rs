//! JSON REST handlers for devices and their outlets.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use plughub_app::ports::{AuditLog, StripClient, TrackerStore};
use plughub_app::reconciler::OutletReport;
use plughub_domain::state::OutletState;
use plughub_domain::time::{Timestamp, now};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body describing one outlet's observed state.
#[derive(Serialize)]
pub struct OutletStateResponse {
    pub state: OutletState,
}

/// Request body for a manual outlet override.
#[derive(Deserialize)]
pub struct SetOutletRequest {
    pub state: OutletState,
}

/// Request body for an externally triggered reconciliation pass.
#[derive(Deserialize)]
pub struct ReconcileRequest {
    /// Event time as epoch seconds; defaults to the current time.
    pub time: Option<Timestamp>,
}

/// `GET /api/devices`
pub async fn list<S, T, A>(State(state): State<AppState<S, T, A>>) -> Json<Vec<String>>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    let mut devices: Vec<String> = state.reconcilers.keys().cloned().collect();
    devices.sort();
    Json(devices)
}

/// `GET /api/device/{device}`
pub async fn snapshot<S, T, A>(
    State(state): State<AppState<S, T, A>>,
    Path(device): Path<String>,
) -> Result<Json<BTreeMap<String, OutletState>>, ApiError>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    let reconciler = state.reconciler(&device)?;
    let states = reconciler.snapshot().await?;
    Ok(Json(states.into_iter().collect()))
}

/// `GET /api/device/{device}/outlet/{outlet}`
pub async fn get_outlet<S, T, A>(
    State(state): State<AppState<S, T, A>>,
    Path((device, outlet)): Path<(String, String)>,
) -> Result<Json<OutletStateResponse>, ApiError>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    let reconciler = state.reconciler(&device)?;
    let observed = reconciler.observed_state(&outlet).await?;
    Ok(Json(OutletStateResponse { state: observed }))
}

/// `PUT /api/device/{device}/outlet/{outlet}`
pub async fn set_outlet<S, T, A>(
    State(state): State<AppState<S, T, A>>,
    Path((device, outlet)): Path<(String, String)>,
    Json(body): Json<SetOutletRequest>,
) -> Result<Json<OutletStateResponse>, ApiError>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    let reconciler = state.reconciler(&device)?;
    reconciler.override_state(&outlet, body.state, now()).await?;
    Ok(Json(OutletStateResponse { state: body.state }))
}

/// `POST /api/device/{device}/reconcile`
pub async fn reconcile<S, T, A>(
    State(state): State<AppState<S, T, A>>,
    Path(device): Path<String>,
    body: Option<Json<ReconcileRequest>>,
) -> Result<(StatusCode, Json<BTreeMap<String, OutletReport>>), ApiError>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    let reconciler = state.reconciler(&device)?;
    let at = body.and_then(|Json(body)| body.time).unwrap_or_else(now);
    let reports = reconciler.reconcile(at).await?;
    Ok((StatusCode::OK, Json(reports.into_iter().collect())))
}
