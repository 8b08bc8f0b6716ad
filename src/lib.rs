//! # Tally
//!
//! A character tally board: an admin editor writes per-character values into
//! a shared key-value namespace, and a ticker display renders how each value
//! and the aggregate moved since the previous write.
//!
//! ## Features
//!
//! - **Lenient records**: corrupt or legacy (`digits`) records decode to safe defaults
//! - **Clamped input**: every value is an integer in 0..=100
//! - **Finite change math**: a rise from zero is reported as +100%
//! - **Live display**: re-render on change notification with a 4 s polling fallback
//!
//! ## Modules
//!
//! - [`storage`]: Key-value port, memory and file stores, typed records
//! - [`tally`]: Values, percent change, trend and record types
//! - [`admin`]: Load / save / reset flows of the editor
//! - [`display`]: Ticker rendering and the watch loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally::storage::{FileStore, TallyStore};
//! use tally::admin::AdminEditor;
//! use tally::display::DisplayRenderer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = TallyStore::new(FileStore::open("./tally_data")?);
//!
//!     // Save new values
//!     let mut editor = AdminEditor::load(records.clone(), vec![]);
//!     let view = editor.save(&["20", "20", "30", "40", "50", "50"])?;
//!     println!("{view}");
//!
//!     // Render the ticker
//!     let renderer = DisplayRenderer::new(records, vec![], "Adventurers Trend");
//!     println!("{}", renderer.render());
//!
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod config;
pub mod display;
pub mod logging;
pub mod storage;
pub mod tally;

// Re-export top-level types for convenience
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, RecordKeys, StorageError, StorageEvent, StorageResult,
    TallyStore,
};

pub use tally::{percent_change, History, Snapshot, Trend, Values, ENTRY_COUNT};

pub use admin::{AdminEditor, AdminView, FormError, FormInput};

pub use display::{DisplayRenderer, DisplayView, Frame, RenderReason, TickerLoop};

pub use config::{generate_default_config, Config, ConfigError, DisplayConfig, EntryConfig, LoggingConfig};
