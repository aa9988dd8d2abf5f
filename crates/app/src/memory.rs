//! In-process port backends.
//!
//! [`MemoryTrackerStore`] and [`MemoryAuditLog`] implement the persistence
//! ports without IO. They back deterministic tests and demo wiring; the
//! durable backends live in the SQLite adapter crate. Clones share the
//! underlying state, so one instance can be handed to a reconciler and
//! another kept for assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use plughub_domain::error::PlugHubError;
use plughub_domain::tracker::{AuditRecord, OutletKey, TransitionRecord};

use crate::ports::{AuditLog, TrackerStore};

/// Tracker store backed by a shared in-process map.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrackerStore {
    records: Arc<Mutex<HashMap<OutletKey, TransitionRecord>>>,
}

impl MemoryTrackerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<OutletKey, TransitionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TrackerStore for MemoryTrackerStore {
    fn get(
        &self,
        key: &OutletKey,
    ) -> impl Future<Output = Result<Option<TransitionRecord>, PlugHubError>> + Send {
        let record = self.lock().get(key).copied();
        async move { Ok(record) }
    }

    fn insert_new(
        &self,
        key: &OutletKey,
        record: TransitionRecord,
    ) -> impl Future<Output = Result<bool, PlugHubError>> + Send {
        let mut records = self.lock();
        let inserted = match records.entry(key.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(record);
                true
            }
        };
        async move { Ok(inserted) }
    }

    fn replace(
        &self,
        key: &OutletKey,
        expected: &TransitionRecord,
        next: TransitionRecord,
    ) -> impl Future<Output = Result<bool, PlugHubError>> + Send {
        let mut records = self.lock();
        let swapped = match records.get_mut(key) {
            Some(current) if current == expected => {
                *current = next;
                true
            }
            _ => false,
        };
        async move { Ok(swapped) }
    }
}

/// Audit log backed by a shared in-process vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(
        &self,
        record: AuditRecord,
    ) -> impl Future<Output = Result<(), PlugHubError>> + Send {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        async { Ok(()) }
    }

    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, PlugHubError>> + Send {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let newest_first: Vec<AuditRecord> = records.iter().rev().take(limit).cloned().collect();
        async move { Ok(newest_first) }
    }
}

use std::future::Future;
