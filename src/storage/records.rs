//! Typed access to the two tally records
//!
//! [`TallyStore`] binds a [`KeyValueStore`] to the snapshot and history
//! keys. Loads never fail: a missing key, an unreadable store or a corrupt
//! record all yield the default record.

use crate::storage::error::StorageResult;
use crate::storage::kv::{KeyValueStore, StorageEvent};
use crate::tally::{History, Snapshot};
use tokio::sync::broadcast;

/// Default key of the snapshot record
pub const DEFAULT_SNAPSHOT_KEY: &str = "rpg-tally-data";

/// Default key of the history record
pub const DEFAULT_HISTORY_KEY: &str = "rpg-tally-history";

/// Keys under which the records live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    pub snapshot: String,
    pub history: String,
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self {
            snapshot: DEFAULT_SNAPSHOT_KEY.to_string(),
            history: DEFAULT_HISTORY_KEY.to_string(),
        }
    }
}

/// Snapshot and history persistence over a shared namespace
#[derive(Debug, Clone)]
pub struct TallyStore<S> {
    store: S,
    keys: RecordKeys,
}

impl<S: KeyValueStore> TallyStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, RecordKeys::default())
    }

    pub fn with_keys(store: S, keys: RecordKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &RecordKeys {
        &self.keys
    }

    /// Underlying namespace
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Load the snapshot, or the all-zero default
    pub fn load_snapshot(&self) -> Snapshot {
        let key = &self.keys.snapshot;
        match self.store.get(key) {
            Ok(Some(raw)) => Snapshot::from_json(&raw).unwrap_or_else(|| {
                tracing::warn!(key = %key, "Corrupt snapshot record, using defaults");
                Snapshot::default()
            }),
            Ok(None) => {
                tracing::debug!(key = %key, "No snapshot stored yet");
                Snapshot::default()
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read snapshot, using defaults");
                Snapshot::default()
            }
        }
    }

    /// Load the history record, or `previousTotal = 0`
    pub fn load_history(&self) -> History {
        let key = &self.keys.history;
        match self.store.get(key) {
            Ok(Some(raw)) => History::from_json(&raw).unwrap_or_else(|| {
                tracing::warn!(key = %key, "Corrupt history record, using defaults");
                History::default()
            }),
            Ok(None) => History::default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read history, using defaults");
                History::default()
            }
        }
    }

    /// Overwrite the snapshot record
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> StorageResult<()> {
        self.store.set(&self.keys.snapshot, &snapshot.to_json()?)
    }

    /// Overwrite the history record
    pub fn save_history(&self, previous_total: f64) -> StorageResult<()> {
        self.store
            .set(&self.keys.history, &History::new(previous_total).to_json()?)
    }

    /// Subscribe to writes in the namespace
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.store.subscribe()
    }

    /// Whether an event concerns the snapshot record
    pub fn is_snapshot_event(&self, event: &StorageEvent) -> bool {
        event.key == self.keys.snapshot
    }
}
