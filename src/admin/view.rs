//! Rendered state of the admin form

use crate::tally::{Trend, ENTRY_COUNT};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fmt;

/// One input row of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRow {
    /// 1-based slot number
    pub slot: usize,
    pub label: String,
    pub value: u32,
}

/// Everything the admin page shows after a load, save or reset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminView {
    pub rows: Vec<FormRow>,
    pub current_total: u32,
    pub previous_total: f64,
    pub trend: Trend,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AdminView {
    /// Text of the trend badge
    pub fn badge(&self) -> &'static str {
        self.trend.badge_label()
    }

    /// The "last updated" line, in local time
    pub fn updated_line(&self) -> String {
        match self.updated_at {
            Some(ts) => format!(
                "Last updated: {}",
                ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            ),
            None => "No updates yet.".to_string(),
        }
    }
}

impl fmt::Display for AdminView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entries ({ENTRY_COUNT})")?;
        for row in &self.rows {
            writeln!(f, "  {}. {:<24} {:>3}", row.slot, row.label, row.value)?;
        }
        writeln!(f)?;
        writeln!(f, "Current total:  {}", self.current_total)?;
        writeln!(f, "Previous total: {}", self.previous_total)?;
        writeln!(f, "Trend:          [{}]", self.badge())?;
        write!(f, "{}", self.updated_line())
    }
}
