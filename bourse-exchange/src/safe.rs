//! Lenient accessors for raw exchange payloads.
//!
//! Exchanges mix strings and numbers for the same field across endpoints.
//! These helpers read either form and return `None` instead of failing on
//! absent or malformed values.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Currency aliases shared by all adapters.
pub const COMMON_CURRENCIES: &[(&str, &str)] = &[
    ("XBT", "BTC"),
    ("BCC", "BCH"),
    ("BCHABC", "BCH"),
    ("BCHSV", "BSV"),
    ("DRK", "DASH"),
];

/// Parse a decimal from plain or scientific notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw).ok().or_else(|| Decimal::from_scientific(raw).ok())
}

/// Field of an object, skipping JSON nulls.
pub fn safe_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// String field; numbers and booleans are rendered as text.
pub fn safe_string(value: &Value, key: &str) -> Option<String> {
    match safe_value(value, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decimal from a bare JSON value.
pub fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

/// Integer from a bare JSON value. Fractional values are truncated.
pub fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| {
            parse_decimal(s).and_then(|d| i64::try_from(d.trunc()).ok())
        }),
        _ => None,
    }
}

/// Boolean field; accepts `true`/`false` strings.
pub fn safe_bool(value: &Value, key: &str) -> Option<bool> {
    match safe_value(value, key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse::<bool>().ok(),
        _ => None,
    }
}

/// Map an exchange currency id to its unified code.
///
/// Adapter-specific aliases in `overrides` take precedence over
/// [`COMMON_CURRENCIES`]. Unmapped ids are upper-cased.
pub fn safe_currency_code(id: &str, overrides: &[(&str, &str)]) -> String {
    let upper = id.to_ascii_uppercase();
    overrides
        .iter()
        .chain(COMMON_CURRENCIES.iter())
        .find(|(alias, _)| *alias == upper)
        .map(|(_, code)| code.to_string())
        .unwrap_or(upper)
}

/// Normalize a timestamp to milliseconds.
///
/// Values below 10^11 are taken to be seconds.
pub fn to_millis(timestamp: i64) -> i64 {
    if timestamp.abs() < 100_000_000_000 {
        timestamp * 1000
    } else {
        timestamp
    }
}
