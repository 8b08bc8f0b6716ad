//! Tally Storage
//!
//! This module provides access to the shared key-value namespace:
//!
//! - **kv**: the `KeyValueStore` port and an in-memory implementation
//! - **file**: a file-backed implementation shared across processes
//! - **records**: typed snapshot/history access over any store
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Snapshot → JSON → KeyValueStore::set (atomic per key) → StorageEvent
//!
//! Read Path:
//!   KeyValueStore::get → lenient decode → Snapshot (default on any failure)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use tally::storage::{FileStore, TallyStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = TallyStore::new(FileStore::open("./tally_data")?);
//!
//!     let snapshot = records.load_snapshot();
//!     println!("Current total: {}", snapshot.total());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file;
pub mod kv;
pub mod records;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use kv::{validate_key, KeyValueStore, MemoryStore, StorageEvent};
pub use records::{RecordKeys, TallyStore, DEFAULT_HISTORY_KEY, DEFAULT_SNAPSHOT_KEY};
