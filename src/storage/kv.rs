//! Key-value store port
//!
//! Both components talk to the shared namespace through [`KeyValueStore`]:
//! string keys, string (JSON) values, and a change feed that fires after
//! every successful write to the namespace.

use crate::storage::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Capacity of the change-notification channel
pub const EVENT_CAPACITY: usize = 64;

/// Notification that a key was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub value: String,
}

/// A shared string-keyed namespace
///
/// Writes are last-write-wins and atomic per key: a reader sees either the
/// previous or the new complete value.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Subscribe to writes in the namespace. Backends shared between
    /// processes also report writes made elsewhere.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Reject keys that cannot be mapped safely onto every backend.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// In-process store; clones share the same namespace
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| StorageError::Lock(e.to_string()))?;
            entries.insert(key.to_string(), value.to_string());
        }

        // No receivers is fine
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("rpg-tally-data").is_ok());
        assert!(validate_key("history_v2.json").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("with space").is_err());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_namespace() {
        let writer = MemoryStore::new();
        let reader = writer.clone();

        writer.set("shared", "1").unwrap();
        assert_eq!(reader.get("shared").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_write_notifies_subscribers() {
        let store = MemoryStore::new();
        let mut rx = store.clone().subscribe();

        store.set("k", "v").unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.value, "v");
    }

    #[test]
    fn test_invalid_key_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set("a/b", "v"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
