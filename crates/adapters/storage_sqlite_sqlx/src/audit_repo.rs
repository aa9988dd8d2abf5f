//! `SQLite` implementation of [`AuditLog`].

use sqlx::SqlitePool;

use plughub_app::ports::AuditLog;
use plughub_domain::error::PlugHubError;
use plughub_domain::state::OutletState;
use plughub_domain::tracker::{AuditRecord, OutletKey};

use crate::error::StorageError;

const INSERT: &str = r"
    INSERT INTO audit_log (outlet_key, resulting_state, recorded_at)
    VALUES (?, ?, ?)
";

const SELECT_RECENT: &str = r"
    SELECT outlet_key, resulting_state, recorded_at
    FROM audit_log
    ORDER BY recorded_at DESC, id DESC
    LIMIT ?
";

/// `SQLite`-backed audit log.
#[derive(Clone)]
pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    /// Create a new log using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AuditLog for SqliteAuditLog {
    async fn append(&self, record: AuditRecord) -> Result<(), PlugHubError> {
        sqlx::query(INSERT)
            .bind(record.outlet_key.as_str())
            .bind(record.resulting_state.to_string())
            .bind(record.recorded_at)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, PlugHubError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<(String, String, i64)> = sqlx::query_as(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|(outlet_key, state_raw, recorded_at)| {
                let resulting_state = OutletState::parse(&state_raw).ok_or_else(|| {
                    plughub_domain::error::TrackerCorruption {
                        key: outlet_key.clone(),
                        detail: format!("audit state {state_raw:?} is not a valid outlet state"),
                    }
                })?;
                Ok(AuditRecord {
                    outlet_key: OutletKey::from_raw(outlet_key),
                    resulting_state,
                    recorded_at,
                })
            })
            .collect()
    }
}
