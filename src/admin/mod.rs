//! Admin editor
//!
//! The write side of the tally: loads the snapshot into a six-slot form,
//! saves edits and resets, and reports totals with a trend badge.

pub mod editor;
pub mod view;

pub use editor::{AdminEditor, FormError, FormInput};
pub use view::{AdminView, FormRow};
