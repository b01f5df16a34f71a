//! Value normalization for matching.
//!
//! `normalize` gives the comparison string of any cell: its string form,
//! trimmed and lowercased. Missing cells normalize to [`MISSING_SENTINEL`].
//!
//! Comparisons go through `normalize_key`, which returns `None` for missing
//! cells (including blank text and NaN). `None` never equals anything, so two
//! empty cells do not match each other.

use crate::model::{format_number, Value};

/// Normalized form of a missing cell.
pub const MISSING_SENTINEL: &str = "nan";

/// String form, trimmed and lowercased. Idempotent.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Text(s) => normalize_str(s),
        Value::Number(n) => normalize_str(&format_number(*n)),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Empty => MISSING_SENTINEL.to_string(),
    }
}

pub fn normalize_str(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Comparison key for a cell, `None` when the cell is missing.
pub fn normalize_key(value: &Value) -> Option<String> {
    match value {
        Value::Empty => None,
        Value::Number(n) if n.is_nan() => None,
        Value::Text(s) if s.trim().is_empty() => None,
        other => Some(normalize(other)),
    }
}
