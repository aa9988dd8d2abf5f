//! # plughub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using sqlx — implements the tracker and
//! audit port traits defined in `plughub-app`.

mod audit_repo;
mod error;
mod pool;
mod tracker_repo;

pub use audit_repo::SqliteAuditLog;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use tracker_repo::SqliteTrackerStore;
