//! JSON REST handler for the audit log.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use plughub_app::ports::{AuditLog, StripClient, TrackerStore};
use plughub_domain::tracker::AuditRecord;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;

/// Query parameters for the audit listing.
#[derive(Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

/// `GET /api/audit`
pub async fn list<S, T, A>(
    State(state): State<AppState<S, T, A>>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditRecord>>, ApiError>
where
    S: StripClient + Send + Sync + 'static,
    T: TrackerStore + Send + Sync + 'static,
    A: AuditLog + Send + Sync + 'static,
{
    let records = state
        .audit
        .recent(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(records))
}
