//! File-backed key-value store
//!
//! Each key lives in its own `<key>.json` file under the data directory.
//! Writes go to a hidden temporary file which is then renamed over the
//! target, so concurrent readers (another `tally` or `tally-ticker`
//! process) only ever observe complete values.
//!
//! The data directory is watched for changes, so writes made by another
//! process show up on [`KeyValueStore::subscribe`] as well.

use crate::storage::error::StorageResult;
use crate::storage::kv::{validate_key, KeyValueStore, StorageEvent, EVENT_CAPACITY};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::Builder;
use tokio::sync::broadcast;

/// Key-value namespace stored as one file per key
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
    events: broadcast::Sender<StorageEvent>,
    // Held only to keep the directory watch alive across clones
    _watcher: Option<Arc<Mutex<RecommendedWatcher>>>,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("root", &self.root)
            .field("watching", &self._watcher.is_some())
            .finish()
    }
}

/// Key stored in `path`, if it is a key file of this namespace
fn key_for_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let key = name.strip_suffix(".json")?;
    validate_key(key).ok()?;
    Some(key.to_string())
}

/// Forward changes to key files under `root` onto `events`
fn watch_root(
    root: &Path,
    events: broadcast::Sender<StorageEvent>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Data directory watch error: {}", e);
                return;
            }
        };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }

        for path in &event.paths {
            let Some(key) = key_for_path(path) else {
                continue;
            };
            // The file may already be replaced again; the next event covers that
            match fs::read_to_string(path) {
                Ok(value) => {
                    tracing::trace!(key = %key, "Key file changed on disk");
                    let _ = events.send(StorageEvent { key, value });
                }
                Err(e) => tracing::trace!(key = %key, "Skipping unreadable key file: {}", e),
            }
        }
    })?;

    watcher.watch(root, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

impl FileStore {
    /// Open (creating if needed) a namespace rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let watcher = match watch_root(&root, events.clone()) {
            Ok(watcher) => Some(Arc::new(Mutex::new(watcher))),
            Err(e) => {
                tracing::warn!(
                    root = %root.display(),
                    "Cannot watch data directory, changes from other processes arrive by polling only: {}",
                    e
                );
                None
            }
        };
        tracing::debug!(root = %root.display(), watching = watcher.is_some(), "Opened file store");

        Ok(Self {
            root,
            events,
            _watcher: watcher,
        })
    }

    /// Directory holding the key files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;

        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;

        // Keys never start with '.', so temp files cannot shadow a key
        let mut temp = Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(".tmp")
            .tempfile_in(&self.root)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.path_for(key)).map_err(|e| e.error)?;

        tracing::trace!(key, bytes = value.len(), "Wrote key file");

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
