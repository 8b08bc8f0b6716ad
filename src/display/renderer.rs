//! Ticker rendering
//!
//! Turns a snapshot into the display summary: one aggregate change
//! indicator and a row of per-entry ticker cards. Rendering is pure given a
//! snapshot, so rendering an unchanged snapshot twice yields identical text.

use crate::storage::{KeyValueStore, StorageEvent, TallyStore};
use crate::tally::{Snapshot, Trend, Values, ENTRY_COUNT};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

/// Format with one decimal, rounding exact ties away from zero
///
/// `{:.1}` rounds exact binary ties (`1.25`, `-6.25`) to even. Only quarter
/// fractions can be exact ties at one decimal, and those are rounded up in
/// magnitude instead.
pub fn one_decimal(value: f64) -> String {
    let exact_tie = (value * 4.0).fract() == 0.0 && (value * 2.0).fract() != 0.0;
    if exact_tie {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    } else {
        format!("{value:.1}")
    }
}

/// Signed percentage with one decimal, e.g. `+5.0%`, `-12.5%`, `0.0%`
pub fn signed_percent(change: f64) -> String {
    let change = if change.is_finite() { change } else { 0.0 };
    let sign = if change > 0.0 {
        "+"
    } else if change < 0.0 {
        "-"
    } else {
        ""
    };
    format!("{sign}{}%", one_decimal(change.abs()))
}

/// Split a name after its first word, the way the cards wrap it
pub fn name_lines(name: &str) -> Vec<String> {
    let mut words = name.split_whitespace();
    let Some(first) = words.next() else {
        return vec![String::new()];
    };
    let rest: Vec<&str> = words.collect();
    if rest.is_empty() {
        vec![first.to_string()]
    } else {
        vec![first.to_string(), rest.join(" ")]
    }
}

/// The aggregate change indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub trend: Trend,
    pub label: String,
}

impl Indicator {
    pub fn new(total_change: f64) -> Self {
        Self {
            trend: Trend::of_change(total_change),
            label: signed_percent(total_change),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.trend.glyph(), self.label)
    }
}

/// One entry of the ticker row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerCard {
    pub name_lines: Vec<String>,
    pub trend: Trend,
    pub label: String,
}

impl TickerCard {
    pub fn new(name: &str, change: f64) -> Self {
        let trend = Trend::of_change(change);
        let label = match trend {
            Trend::Flat => "0.0%".to_string(),
            _ => signed_percent(change),
        };
        Self {
            name_lines: name_lines(name),
            trend,
            label,
        }
    }

    /// Glyph and label, e.g. `▼ -12.5%`
    pub fn change_text(&self) -> String {
        format!("{} {}", self.trend.glyph(), self.label)
    }
}

/// Everything the display page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayView {
    pub title: String,
    pub indicator: Indicator,
    pub cards: Vec<TickerCard>,
    pub values: Values,
    pub total: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl fmt::Display for DisplayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.indicator)?;
        for card in &self.cards {
            writeln!(f)?;
            let mut lines = card.name_lines.iter();
            let first = lines.next().map(String::as_str).unwrap_or("");
            write!(f, "{:<16} {}", first, card.change_text())?;
            for line in lines {
                write!(f, "\n{line}")?;
            }
        }

        let values: Vec<String> = self.values.iter().map(u32::to_string).collect();
        write!(f, "\n\nValues {} · total {}", values.join(" "), self.total)
    }
}

/// The display page bound to a shared namespace. Never writes.
#[derive(Debug, Clone)]
pub struct DisplayRenderer<S> {
    records: TallyStore<S>,
    names: Vec<String>,
    title_prefix: String,
}

impl<S: KeyValueStore> DisplayRenderer<S> {
    pub fn new(records: TallyStore<S>, names: Vec<String>, title_prefix: impl Into<String>) -> Self {
        Self {
            records,
            names,
            title_prefix: title_prefix.into(),
        }
    }

    fn name(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Character {}", index + 1))
    }

    /// Load the current snapshot and render it
    pub fn render(&self) -> DisplayView {
        self.render_snapshot(&self.records.load_snapshot())
    }

    /// Render a given snapshot
    pub fn render_snapshot(&self, snapshot: &Snapshot) -> DisplayView {
        // Stored values are clamped on decode already
        let values = snapshot.values;
        let total_change = if snapshot.total_change.is_finite() && snapshot.total_change != 0.0 {
            snapshot.total_change
        } else {
            0.0
        };

        DisplayView {
            title: format!("{} · {}%", self.title_prefix, one_decimal(total_change)),
            indicator: Indicator::new(total_change),
            cards: (0..ENTRY_COUNT)
                .map(|i| TickerCard::new(&self.name(i), snapshot.changes[i]))
                .collect(),
            values,
            total: snapshot.total(),
            updated_at: snapshot.updated_at,
        }
    }

    /// Subscribe to writes in the namespace
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.records.subscribe()
    }

    /// Whether an event should trigger a re-render
    pub fn is_snapshot_event(&self, event: &StorageEvent) -> bool {
        self.records.is_snapshot_event(event)
    }
}
