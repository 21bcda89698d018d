//! Lossy coercions for the known customer columns.
//!
//! Every rule here returns `Option`: `None` means "could not interpret this",
//! which the pipeline records as a missing cell and later drops or fills.
//! Nothing in this module returns an error.

use crate::constants::{DEFAULT_OPEN_COMPLAINTS, GENDER_MAP};
use crate::table::Value;

/// Map a raw gender spelling onto `"M"`/`"F"`
pub fn normalize_gender(raw: &str) -> Option<&'static str> {
    GENDER_MAP
        .iter()
        .find(|(spelling, _)| *spelling == raw)
        .map(|(_, code)| *code)
}

/// Strip `%` signs and parse the rest as a finite number
pub fn parse_lifetime_value(raw: &str) -> Option<f64> {
    let stripped = raw.replace('%', "");
    parse_finite(stripped.trim())
}

/// Extract the open complaints count from an `"x/count/y"` entry.
///
/// An entry without any `/` is taken to be a bare count already.
pub fn parse_open_complaints(raw: &str) -> Option<i64> {
    let mut fields = raw.split('/');
    let first = fields.next()?;
    match fields.next() {
        Some(count) => parse_whole_number(count),
        None => parse_whole_number(first),
    }
}

/// Truncate toward zero. `None` for non-finite or out-of-range input.
pub fn truncate_to_int(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Cell-level gender coercion. Non-text cells are not interpretable.
pub fn coerce_gender(value: &Value) -> Value {
    value
        .as_str()
        .and_then(normalize_gender)
        .map(Value::text)
        .unwrap_or(Value::Missing)
}

/// Cell-level lifetime value coercion. Numbers pass through as floats, and
/// anything that would not fit an integer once truncated is missing.
pub fn coerce_lifetime_value(value: &Value) -> Value {
    let parsed = match value {
        Value::Text(raw) => parse_lifetime_value(raw),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Missing => None,
    };
    parsed.filter(|v| truncate_to_int(*v).is_some()).into()
}

/// Cell-level open complaints coercion. Missing cells read as `"0/0/0"`.
pub fn coerce_open_complaints(value: &Value) -> Value {
    match value {
        Value::Missing => parse_open_complaints(DEFAULT_OPEN_COMPLAINTS).into(),
        Value::Text(raw) => parse_open_complaints(raw).into(),
        Value::Int(i) => Value::Int(*i),
        Value::Float(f) if f.fract() == 0.0 => truncate_to_int(*f).into(),
        Value::Float(_) => Value::Missing,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_whole_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(count) = raw.parse::<i64>() {
        return Some(count);
    }
    parse_finite(raw)
        .filter(|v| v.fract() == 0.0)
        .and_then(truncate_to_int)
}
