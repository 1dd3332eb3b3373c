//! Event reconciliation.
//!
//! # State Transitions
//! ```text
//! Added | Modified, SingleKey(k):  k present      → {k: value}
//!                                  k missing      → unchanged
//! Added | Modified, AllKeys:       data non-empty → copy of data
//!                                  data empty     → unchanged
//! Deleted:                                        → default map
//! Other:                                          → unchanged
//! ```
//!
//! A missing key or an empty payload keeps the previous snapshot: a transient
//! gap in the ConfigMap must not blank out data that is already being served.

use crate::snapshot::{Snapshot, SnapshotStore};
use crate::watch::event::{ConfigRecord, RecordEvent};

/// Which part of the ConfigMap is served. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Serve one named key.
    SingleKey(String),
    /// Serve the whole data map.
    AllKeys,
}

impl SelectionMode {
    /// `None` or an empty key selects every key.
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some(k) if !k.is_empty() => SelectionMode::SingleKey(k.to_string()),
            _ => SelectionMode::AllKeys,
        }
    }

    /// The selected key, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            SelectionMode::SingleKey(k) => Some(k),
            SelectionMode::AllKeys => None,
        }
    }
}

/// Why an add/modify left the snapshot alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    KeyMissing,
    EmptyData,
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// A new snapshot was installed.
    Replaced,
    /// The default map was installed after a deletion.
    ResetToDefault,
    /// The event carried nothing servable; the previous snapshot stays.
    KeptStale(StaleReason),
    /// The event was not a change to the target.
    Ignored,
}

impl Reconciliation {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Reconciliation::Replaced => "replaced",
            Reconciliation::ResetToDefault => "reset_to_default",
            Reconciliation::KeptStale(StaleReason::KeyMissing) => "kept_stale_key_missing",
            Reconciliation::KeptStale(StaleReason::EmptyData) => "kept_stale_empty_data",
            Reconciliation::Ignored => "ignored",
        }
    }
}

/// Maps events onto the snapshot store.
#[derive(Debug, Clone)]
pub struct Reconciler {
    mode: SelectionMode,
    default_data: Snapshot,
}

impl Reconciler {
    pub fn new(mode: SelectionMode, default_data: Snapshot) -> Self {
        Self { mode, default_data }
    }

    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    pub fn default_data(&self) -> &Snapshot {
        &self.default_data
    }

    /// Apply `event` to `store`. Never fails; unusable events keep the current snapshot.
    pub fn apply(&self, event: &RecordEvent, store: &SnapshotStore) -> Reconciliation {
        match event {
            RecordEvent::Added(record) | RecordEvent::Modified(record) => {
                match self.select(record) {
                    Ok(next) => {
                        store.replace(next);
                        Reconciliation::Replaced
                    }
                    Err(reason) => Reconciliation::KeptStale(reason),
                }
            }
            RecordEvent::Deleted(_) => {
                store.replace(self.default_data.clone());
                Reconciliation::ResetToDefault
            }
            RecordEvent::Other(_) => Reconciliation::Ignored,
        }
    }

    /// The snapshot `record` should produce, or why it produces none.
    fn select(&self, record: &ConfigRecord) -> Result<Snapshot, StaleReason> {
        match &self.mode {
            SelectionMode::SingleKey(key) => record
                .data
                .get(key)
                .map(|value| Snapshot::from([(key.clone(), value.clone())]))
                .ok_or(StaleReason::KeyMissing),
            SelectionMode::AllKeys if record.data.is_empty() => Err(StaleReason::EmptyData),
            SelectionMode::AllKeys => Ok(record.data.clone()),
        }
    }
}
