//! Percent-change computation and trend classification

use crate::tally::values::{total, Values, ENTRY_COUNT};
use serde::Serialize;

/// Per-entry percent changes
pub type Changes = [f64; ENTRY_COUNT];

/// Percent change from `previous` to `current`.
///
/// A rise from zero is reported as exactly +100% so the result is always
/// finite. Non-finite operands yield 0.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }

    if previous == 0.0 {
        return if current == 0.0 { 0.0 } else { 100.0 };
    }

    (current - previous) / previous * 100.0
}

/// Percent change of each entry
pub fn entry_changes(previous: &Values, current: &Values) -> Changes {
    let mut changes = [0.0; ENTRY_COUNT];
    for (i, change) in changes.iter_mut().enumerate() {
        *change = percent_change(f64::from(previous[i]), f64::from(current[i]));
    }
    changes
}

/// Percent change of the aggregate
pub fn total_change(previous: &Values, current: &Values) -> f64 {
    percent_change(f64::from(total(previous)), f64::from(total(current)))
}

/// Direction of a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Compare a current aggregate against the recorded previous one
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    /// Classify a percent change; zero and non-finite changes are flat
    pub fn of_change(change: f64) -> Self {
        if !change.is_finite() || change == 0.0 {
            Trend::Flat
        } else if change > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    /// Text of the admin trend badge
    pub fn badge_label(&self) -> &'static str {
        match self {
            Trend::Up => "Up",
            Trend::Down => "Down",
            Trend::Flat => "No Change",
        }
    }

    /// Glyph used by the ticker
    pub fn glyph(&self) -> char {
        match self {
            Trend::Up => '▲',
            Trend::Down => '▼',
            Trend::Flat => '•',
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Flat => write!(f, "flat"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_reference_points() {
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 7.0), 100.0);
        assert_eq!(percent_change(50.0, 75.0), 50.0);
        assert_eq!(percent_change(100.0, 50.0), -50.0);
        assert_eq!(percent_change(200.0, 210.0), 5.0);
        assert_eq!(percent_change(10.0, 0.0), -100.0);
    }

    #[test]
    fn test_percent_change_non_finite() {
        assert_eq!(percent_change(f64::NAN, 10.0), 0.0);
        assert_eq!(percent_change(10.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_entry_and_total_changes() {
        let previous = [10, 20, 30, 40, 50, 50];
        let current = [20, 20, 30, 40, 50, 50];

        let changes = entry_changes(&previous, &current);
        assert_eq!(changes, [100.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(total_change(&previous, &current), 5.0);
    }

    #[test]
    fn test_rise_from_zero_entry() {
        let changes = entry_changes(&[0; ENTRY_COUNT], &[0, 3, 0, 0, 0, 0]);
        assert_eq!(changes[1], 100.0);
        assert_eq!(changes[0], 0.0);
    }

    #[test]
    fn test_trend_between() {
        assert_eq!(Trend::between(200.0, 210.0), Trend::Up);
        assert_eq!(Trend::between(200.0, 190.0), Trend::Down);
        assert_eq!(Trend::between(200.0, 200.0), Trend::Flat);
        assert_eq!(Trend::between(200.0, 200.0).badge_label(), "No Change");
    }

    #[test]
    fn test_trend_of_change() {
        assert_eq!(Trend::of_change(33.3), Trend::Up);
        assert_eq!(Trend::of_change(-12.5), Trend::Down);
        assert_eq!(Trend::of_change(0.0), Trend::Flat);
        assert_eq!(Trend::of_change(-0.0), Trend::Flat);
        assert_eq!(Trend::of_change(f64::NAN), Trend::Flat);
        assert_eq!(Trend::Down.glyph(), '▼');
    }
}
