//! Display renderer
//!
//! The read side of the tally. It never writes; it renders the snapshot as
//! an aggregate indicator plus a ticker row, and keeps re-rendering from
//! change notifications and a polling fallback.

pub mod renderer;
pub mod watcher;

pub use renderer::{name_lines, signed_percent, DisplayRenderer, DisplayView, Indicator, TickerCard};
pub use watcher::{Frame, RenderReason, TickerLoop};
