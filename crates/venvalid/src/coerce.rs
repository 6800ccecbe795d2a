//! Raw string to [`Value`] coercion.
//!
//! Strings, booleans, lists and paths never fail. Integers, decimals,
//! datetimes and JSON return [`CoerceError`] on malformed input.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::spec::TypeTag;
use crate::value::Value;

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// Date-time layouts accepted after RFC 3339, with offset.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Date-time layouts without offset; interpreted as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Raw input could not be parsed as the expected type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {expected}")]
pub struct CoerceError {
    pub expected: TypeTag,
}

impl CoerceError {
    fn new(expected: TypeTag) -> Self {
        CoerceError { expected }
    }
}

/// Coerce `raw` into a value of type `ty`.
pub fn coerce(raw: &str, ty: TypeTag) -> Result<Value, CoerceError> {
    match ty {
        TypeTag::String => Ok(Value::String(raw.to_string())),
        TypeTag::Boolean => Ok(Value::Boolean(parse_bool(raw))),
        TypeTag::List => Ok(Value::List(parse_list(raw))),
        TypeTag::Path => Ok(Value::Path(PathBuf::from(raw))),
        TypeTag::Integer => parse_integer(raw)
            .map(Value::Integer)
            .ok_or_else(|| CoerceError::new(ty)),
        TypeTag::Decimal => parse_decimal(raw)
            .map(Value::Decimal)
            .ok_or_else(|| CoerceError::new(ty)),
        TypeTag::DateTime => parse_datetime(raw)
            .map(Value::DateTime)
            .ok_or_else(|| CoerceError::new(ty)),
        TypeTag::Json => serde_json::from_str(raw)
            .map(Value::Json)
            .map_err(|_| CoerceError::new(ty)),
    }
}

/// Trimmed, case-insensitive membership in {1, true, yes, on}.
pub fn parse_bool(raw: &str) -> bool {
    let normalized = raw.trim().to_lowercase();
    TRUTHY.contains(&normalized.as_str())
}

/// Comma-separated segments, each trimmed. Empty input yields one empty segment.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Signed 64-bit integer; `_` is accepted between two digits.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.contains('_') {
        let bytes = s.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b != b'_' {
                continue;
            }
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            let between_digits = matches!(before, Some(c) if c.is_ascii_digit())
                && matches!(after, Some(c) if c.is_ascii_digit());
            if !between_digits {
                return None;
            }
        }
        return s.replace('_', "").parse().ok();
    }
    s.parse().ok()
}

/// Plain or scientific decimal notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// RFC 3339 / ISO 8601 date-time, or a bare date at midnight.
///
/// Inputs without an offset are taken as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}
