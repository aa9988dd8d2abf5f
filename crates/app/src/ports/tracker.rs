//! Tracker port — persisted next-transition records for repeating cycles.

use std::future::Future;

use plughub_domain::error::PlugHubError;
use plughub_domain::tracker::{OutletKey, TransitionRecord};

/// Keyed store of at most one pending [`TransitionRecord`] per outlet.
///
/// Both mutating operations are compare-and-swap shaped: they report
/// whether the caller won, and a caller that lost must re-read and adopt
/// the winner's record instead of advancing again. This is what keeps two
/// concurrent reconciliation passes from double-advancing a cycle.
pub trait TrackerStore: Send + Sync {
    /// Fetch the pending record for `key`, if any.
    ///
    /// A record that exists but cannot be decoded surfaces as
    /// [`PlugHubError::Tracker`]; callers fall back to the outlet default
    /// rather than crash.
    fn get(
        &self,
        key: &OutletKey,
    ) -> impl Future<Output = Result<Option<TransitionRecord>, PlugHubError>> + Send;

    /// Create the first record for `key`. Returns `false` when a record
    /// already exists (another writer got there first).
    fn insert_new(
        &self,
        key: &OutletKey,
        record: TransitionRecord,
    ) -> impl Future<Output = Result<bool, PlugHubError>> + Send;

    /// Atomically replace `expected` with `next`. Returns `false` when the
    /// stored record no longer equals `expected`.
    fn replace(
        &self,
        key: &OutletKey,
        expected: &TransitionRecord,
        next: TransitionRecord,
    ) -> impl Future<Output = Result<bool, PlugHubError>> + Send;
}
