//! Tally domain
//!
//! - **values**: parsing, clamping and totals for raw entries
//! - **change**: percent change and trend classification
//! - **types**: the persisted `Snapshot` and `History` records

pub mod change;
pub mod types;
pub mod values;

pub use change::{entry_changes, percent_change, total_change, Changes, Trend};
pub use types::{History, Snapshot};
pub use values::{
    clamp_value, format_values, parse_value, total, Values, ENTRY_COUNT, MAX_VALUE, MIN_VALUE,
};
