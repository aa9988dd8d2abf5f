//! `SQLite` implementation of [`TrackerStore`].
//!
//! The compare-and-swap contract maps onto guarded SQL: the insert carries
//! `ON CONFLICT DO NOTHING`, the replace predicates on the expected row
//! values, and both report success through the affected-row count. `SQLite`
//! serializes writers, so an affected count of one is proof the caller won.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use plughub_app::ports::TrackerStore;
use plughub_domain::error::{PlugHubError, TrackerCorruption};
use plughub_domain::state::OutletState;
use plughub_domain::tracker::{OutletKey, TransitionRecord};

use crate::error::StorageError;

const SELECT: &str = "SELECT scheduled_at, resulting_state FROM transitions WHERE outlet_key = ?";

const INSERT: &str = r"
    INSERT INTO transitions (outlet_key, scheduled_at, resulting_state)
    VALUES (?, ?, ?)
    ON CONFLICT (outlet_key) DO NOTHING
";

const REPLACE: &str = r"
    UPDATE transitions
    SET scheduled_at = ?, resulting_state = ?
    WHERE outlet_key = ? AND scheduled_at = ? AND resulting_state = ?
";

/// `SQLite`-backed tracker store.
#[derive(Clone)]
pub struct SqliteTrackerStore {
    pool: SqlitePool,
}

impl SqliteTrackerStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn decode_record(key: &OutletKey, row: &SqliteRow) -> Result<TransitionRecord, PlugHubError> {
    let scheduled_at: i64 = row.try_get("scheduled_at").map_err(StorageError::from)?;
    let state_raw: String = row.try_get("resulting_state").map_err(StorageError::from)?;
    let resulting_state =
        OutletState::parse(&state_raw).ok_or_else(|| TrackerCorruption {
            key: key.to_string(),
            detail: format!("resulting_state {state_raw:?} is not a valid outlet state"),
        })?;
    Ok(TransitionRecord {
        scheduled_at,
        resulting_state,
    })
}

impl TrackerStore for SqliteTrackerStore {
    async fn get(&self, key: &OutletKey) -> Result<Option<TransitionRecord>, PlugHubError> {
        let row = sqlx::query(SELECT)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        row.map(|row| decode_record(key, &row)).transpose()
    }

    async fn insert_new(
        &self,
        key: &OutletKey,
        record: TransitionRecord,
    ) -> Result<bool, PlugHubError> {
        let result = sqlx::query(INSERT)
            .bind(key.as_str())
            .bind(record.scheduled_at)
            .bind(record.resulting_state.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace(
        &self,
        key: &OutletKey,
        expected: &TransitionRecord,
        next: TransitionRecord,
    ) -> Result<bool, PlugHubError> {
        let result = sqlx::query(REPLACE)
            .bind(next.scheduled_at)
            .bind(next.resulting_state.to_string())
            .bind(key.as_str())
            .bind(expected.scheduled_at)
            .bind(expected.resulting_state.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() == 1)
    }
}
