//! Strict parsing of raw client input
//!
//! Malformed numbers are rejected with a `Validation` error instead of being
//! coerced to zero.

use crate::error::{Result, WarfareError};
use std::collections::HashMap;

/// Fetch a required form field
pub fn require<'a>(form: &'a HashMap<String, String>, field: &'static str) -> Result<&'a str> {
    form.get(field)
        .map(String::as_str)
        .ok_or_else(|| WarfareError::validation(field, "missing"))
}

/// Parse a non-negative integer (gold amounts, counters)
pub fn parse_amount(field: &'static str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| WarfareError::validation(field, format!("{:?} is not a non-negative integer", raw)))
}

/// Parse a finite coordinate
pub fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| WarfareError::validation(field, format!("{:?} is not a number", raw)))?;
    check_coordinate(field, value)
}

/// Reject NaN and infinities, which cannot be stored
pub fn check_coordinate(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(WarfareError::validation(field, "must be finite"))
    }
}

/// Only the exact string `"true"` is true
#[inline]
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}
