//! Persisted tally records
//!
//! - `Snapshot`: current values, their changes and the last-write timestamp
//! - `History`: the aggregate recorded one write ago, for the trend badge
//!
//! Both are written in one canonical camelCase JSON shape and decoded
//! leniently: older records that carry `digits` instead of `values`, string
//! numbers, short arrays or garbage fields all decode to well-formed values.

use crate::tally::change::{entry_changes, total_change, Changes};
use crate::tally::values::{number_from_json, total, values_from_json, Values, ENTRY_COUNT};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Current state of the tally
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// One clamped value per tracked entry
    pub values: Values,
    /// Percent change of each value vs. the previous snapshot
    pub changes: Changes,
    /// Percent change of the aggregate vs. the previous snapshot
    pub total_change: f64,
    /// Values of the previous snapshot
    pub previous_values: Values,
    /// Time of the last save or reset; `None` if never written
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn serialize_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_some(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

/// Loosely-typed view of a stored snapshot; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    values: Option<Value>,
    /// Legacy single-digit counter field
    #[serde(default)]
    digits: Option<Value>,
    #[serde(default)]
    changes: Option<Value>,
    #[serde(default)]
    total_change: Option<Value>,
    #[serde(default)]
    previous_values: Option<Value>,
    #[serde(default)]
    updated_at: Option<Value>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            values: [0; ENTRY_COUNT],
            changes: [0.0; ENTRY_COUNT],
            total_change: 0.0,
            previous_values: [0; ENTRY_COUNT],
            updated_at: None,
        }
    }
}

impl Snapshot {
    /// Decode a stored snapshot.
    ///
    /// Returns `None` only when `raw` is not a JSON object; individual bad
    /// fields fall back to their defaults.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        if !value.is_object() {
            return None;
        }
        let raw: RawSnapshot = serde_json::from_value(value).ok()?;

        let values = values_from_json(raw.values.as_ref())
            .or_else(|| values_from_json(raw.digits.as_ref()))
            .unwrap_or([0; ENTRY_COUNT]);

        let mut changes = [0.0; ENTRY_COUNT];
        if let Some(items) = raw.changes.as_ref().and_then(Value::as_array) {
            for (slot, item) in changes.iter_mut().zip(items) {
                *slot = number_from_json(item);
            }
        }

        // Only genuine numbers count; a stringly total is not trusted
        let total_change = raw
            .total_change
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|f| f.is_finite())
            .unwrap_or(0.0);

        let previous_values =
            values_from_json(raw.previous_values.as_ref()).unwrap_or([0; ENTRY_COUNT]);

        let updated_at = raw
            .updated_at
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Self {
            values,
            changes,
            total_change,
            previous_values,
            updated_at,
        })
    }

    /// Encode in the canonical stored shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Aggregate of the current values
    pub fn total(&self) -> u32 {
        total(&self.values)
    }

    /// Whether this snapshot was ever written by a save or reset
    pub fn is_recorded(&self) -> bool {
        self.updated_at.is_some()
    }

    /// The snapshot that replaces `self` when `values` are saved at `at`.
    pub fn successor(&self, values: Values, at: DateTime<Utc>) -> Self {
        Self {
            values,
            changes: entry_changes(&self.values, &values),
            total_change: total_change(&self.values, &values),
            previous_values: self.values,
            updated_at: Some(at),
        }
    }

    /// The all-zero snapshot written by a reset at `at`.
    pub fn zeroed(at: DateTime<Utc>) -> Self {
        Self {
            updated_at: Some(at),
            ..Self::default()
        }
    }
}

/// Aggregate as of the previous write
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub previous_total: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHistory {
    #[serde(default)]
    previous_total: Option<Value>,
}

impl History {
    pub fn new(previous_total: f64) -> Self {
        Self { previous_total }
    }

    /// Decode a stored history record; `previousTotal` may be a number or a
    /// numeric string. Returns `None` when `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        if !value.is_object() {
            return None;
        }
        let raw: RawHistory = serde_json::from_value(value).ok()?;

        Some(Self {
            previous_total: raw
                .previous_total
                .as_ref()
                .map(number_from_json)
                .unwrap_or(0.0),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_default_snapshot() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.values, [0; ENTRY_COUNT]);
        assert_eq!(snapshot.changes, [0.0; ENTRY_COUNT]);
        assert_eq!(snapshot.total_change, 0.0);
        assert!(!snapshot.is_recorded());
    }

    #[test]
    fn test_canonical_encoding() {
        let snapshot = Snapshot::default().successor([20, 20, 30, 40, 50, 50], at());
        let json: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(json["values"], serde_json::json!([20, 20, 30, 40, 50, 50]));
        assert_eq!(json["previousValues"], serde_json::json!([0, 0, 0, 0, 0, 0]));
        assert_eq!(json["totalChange"], serde_json::json!(100.0));
        assert_eq!(json["updatedAt"], "2026-10-18T12:30:00.000Z");
    }

    #[test]
    fn test_never_written_encodes_null_timestamp() {
        let json: Value =
            serde_json::from_str(&Snapshot::default().to_json().unwrap()).unwrap();
        assert!(json["updatedAt"].is_null());
    }

    #[test]
    fn test_decode_roundtrip() {
        let snapshot = Snapshot::default().successor([1, 2, 3, 4, 5, 6], at());
        let decoded = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_decode_legacy_digits() {
        let raw = r#"{"digits":["3","7","0","9","1","2"],"changes":[0,"12.5","",0,0,0],"updatedAt":"2024-01-02T03:04:05.000Z"}"#;
        let snapshot = Snapshot::from_json(raw).unwrap();

        assert_eq!(snapshot.values, [3, 7, 0, 9, 1, 2]);
        assert_eq!(snapshot.changes, [0.0, 12.5, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(snapshot.total_change, 0.0);
        assert!(snapshot.is_recorded());
    }

    #[test]
    fn test_values_preferred_over_digits() {
        let raw = r#"{"values":[5,5,5,5,5,5],"digits":["1","1","1","1","1","1"]}"#;
        assert_eq!(Snapshot::from_json(raw).unwrap().values, [5; ENTRY_COUNT]);
    }

    #[test]
    fn test_decode_malformed_fields() {
        let raw = r#"{"values":[500,-3,"x",null,42.7],"changes":"nope","totalChange":"5","previousValues":7,"updatedAt":"yesterday"}"#;
        let snapshot = Snapshot::from_json(raw).unwrap();

        assert_eq!(snapshot.values, [100, 0, 0, 0, 42, 0]);
        assert_eq!(snapshot.changes, [0.0; ENTRY_COUNT]);
        assert_eq!(snapshot.total_change, 0.0);
        assert_eq!(snapshot.previous_values, [0; ENTRY_COUNT]);
        assert_eq!(snapshot.updated_at, None);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(Snapshot::from_json("not json").is_none());
        assert!(Snapshot::from_json("[1,2,3]").is_none());
        assert!(Snapshot::from_json("null").is_none());
        assert!(Snapshot::from_json("42").is_none());
    }

    #[test]
    fn test_successor_computes_changes() {
        let previous = Snapshot {
            values: [10, 20, 30, 40, 50, 50],
            updated_at: Some(at()),
            ..Snapshot::default()
        };
        let next = previous.successor([20, 20, 30, 40, 50, 50], at());

        assert_eq!(next.changes[0], 100.0);
        assert_eq!(next.total_change, 5.0);
        assert_eq!(next.previous_values, [10, 20, 30, 40, 50, 50]);
        assert_eq!(next.total(), 210);
    }

    #[test]
    fn test_zeroed() {
        let snapshot = Snapshot::zeroed(at());
        assert_eq!(snapshot.values, [0; ENTRY_COUNT]);
        assert_eq!(snapshot.updated_at, Some(at()));
    }

    #[test]
    fn test_history_decode() {
        assert_eq!(
            History::from_json(r#"{"previousTotal":200}"#),
            Some(History::new(200.0))
        );
        assert_eq!(
            History::from_json(r#"{"previousTotal":"185"}"#),
            Some(History::new(185.0))
        );
        assert_eq!(History::from_json("{}"), Some(History::new(0.0)));
        assert_eq!(History::from_json("{oops"), None);
        assert_eq!(History::new(200.0).to_json().unwrap(), r#"{"previousTotal":200.0}"#);
    }
}
