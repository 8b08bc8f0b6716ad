//! Input validation and clamping
//!
//! Raw entries arrive as form text, legacy digit strings or JSON numbers.
//! Every path funnels into [`clamp_value`], so a well-formed [`Values`]
//! array always holds exactly [`ENTRY_COUNT`] integers in
//! [`MIN_VALUE`]..=[`MAX_VALUE`].

use serde_json::Value;

/// Number of tracked entries
pub const ENTRY_COUNT: usize = 6;

/// Lowest storable value
pub const MIN_VALUE: i64 = 0;

/// Highest storable value
pub const MAX_VALUE: i64 = 100;

/// One value per tracked entry
pub type Values = [u32; ENTRY_COUNT];

/// Clamp to the storable range. Out-of-range input is corrected, not rejected.
pub fn clamp_value(value: i64) -> u32 {
    value.clamp(MIN_VALUE, MAX_VALUE) as u32
}

/// Parse the leading base-10 integer of `raw`.
///
/// Leading whitespace and one sign character are accepted; parsing stops at
/// the first non-digit (`"12abc"` → 12, `"3.9"` → 3). Returns `None` when no
/// digit follows. Magnitudes beyond `i64` saturate.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut seen = false;
    let mut acc: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        acc = acc.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    seen.then(|| if negative { -acc } else { acc })
}

/// Parse one raw form entry; unparseable input becomes 0.
pub fn parse_value(raw: &str) -> u32 {
    parse_int_prefix(raw).map(clamp_value).unwrap_or(0)
}

/// Decode one stored entry (number or numeric string).
pub fn value_from_json(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                clamp_value(i)
            } else {
                match n.as_f64() {
                    // `as` saturates, and trunc matches integer-prefix parsing
                    Some(f) if f.is_finite() => clamp_value(f.trunc() as i64),
                    _ => 0,
                }
            }
        }
        Value::String(s) => parse_value(s),
        _ => 0,
    }
}

/// Normalize a stored array into exactly [`ENTRY_COUNT`] clamped values.
///
/// Returns `None` when `value` is not an array at all, so callers can fall
/// back to another field.
pub fn values_from_json(value: Option<&Value>) -> Option<Values> {
    let items = value?.as_array()?;
    let mut values = [0; ENTRY_COUNT];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = value_from_json(item);
    }
    Some(values)
}

/// Validate and clamp a list of raw form entries.
///
/// Missing trailing entries become 0; extra entries are ignored.
pub fn format_values<S: AsRef<str>>(raw: &[S]) -> Values {
    let mut values = [0; ENTRY_COUNT];
    for (slot, item) in values.iter_mut().zip(raw) {
        *slot = parse_value(item.as_ref());
    }
    values
}

/// Aggregate of all entries
pub fn total(values: &Values) -> u32 {
    values.iter().sum()
}

/// Coerce a stored JSON number or numeric string into a finite `f64`.
///
/// Empty strings are 0; anything non-numeric or non-finite is 0.
pub fn number_from_json(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}
