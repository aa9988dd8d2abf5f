//! Audit port — append-only log of issued state transitions.

use std::future::Future;

use plughub_domain::error::PlugHubError;
use plughub_domain::tracker::AuditRecord;

/// Append-only record of every corrective command the engine issued.
pub trait AuditLog: Send + Sync {
    /// Append one record. Failures are logged by callers and never block
    /// reconciliation of other outlets.
    fn append(
        &self,
        record: AuditRecord,
    ) -> impl Future<Output = Result<(), PlugHubError>> + Send;

    /// The most recent `limit` records, newest first.
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, PlugHubError>> + Send;
}
