//! Rows and the values read out of them.
//!
//! A row is an opaque JSON object. Columns read one field each through an
//! accessor, and every consumer (filter, sort, grid, CSV) branches on the
//! [`CellValue`] kind rather than inspecting JSON types ad hoc.

use serde_json::{Map, Number, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// One record, keyed by field name.
pub type Row = Map<String, Value>;

/// The value a column reads out of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    /// Field absent or `null`.
    Missing,
    /// String, number, bool, or a nested object.
    Scalar(&'a Value),
    /// Ordered list of values or sub-records (e.g. project subparts).
    Sequence(&'a [Value]),
}

impl<'a> CellValue<'a> {
    pub fn of(row: &'a Row, accessor: &str) -> Self {
        match row.get(accessor) {
            None | Some(Value::Null) => CellValue::Missing,
            Some(Value::Array(items)) => CellValue::Sequence(items),
            Some(value) => CellValue::Scalar(value),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Text fragments used for matching: the scalar itself, or each
    /// non-null element of a sequence.
    pub fn fragments(&self) -> Vec<String> {
        match self {
            CellValue::Missing => Vec::new(),
            CellValue::Scalar(value) => vec![stringify(value)],
            CellValue::Sequence(items) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(stringify)
                .collect(),
        }
    }

    /// Display text for the grid, `None` when there is nothing to show.
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Scalar(value) => Some(display_text(value)),
            CellValue::Sequence(items) => {
                let has_records = items.iter().any(Value::is_object);
                let sep = if has_records { " | " } else { ", " };
                Some(
                    items
                        .iter()
                        .map(display_text)
                        .collect::<Vec<_>>()
                        .join(sep),
                )
            }
        }
    }

    /// Single CSV field. Missing values export empty, sequences flatten
    /// into one field with records encoded as JSON.
    pub fn export_text(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            CellValue::Scalar(Value::Object(map)) => {
                serde_json::to_string(map).unwrap_or_default()
            }
            CellValue::Scalar(value) => stringify(value),
            CellValue::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(_) | Value::Array(_) => {
                        serde_json::to_string(item).unwrap_or_default()
                    }
                    other => stringify(other),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Plain text form of a JSON value, used for matching and comparison.
///
/// Records collapse to their field values joined by a space so that a
/// search hits their contents, not their keys.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(map) => map
            .values()
            .filter(|v| !v.is_null())
            .map(stringify)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| format!("{}: {}", key, display_text(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => items.iter().map(display_text).collect::<Vec<_>>().join(", "),
        other => stringify(other),
    }
}

/// Integral floats print without a trailing `.0` so `12.0` and `12` read the same.
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Rendering key for a row.
///
/// Uses the id field when present. Otherwise derives one from the row's
/// position and a hash of its serialized content; identical rows at the
/// same position collide, so the key is only fit for display.
pub fn row_key(row: &Row, id_field: &str, position: usize) -> String {
    match row.get(id_field) {
        Some(id) if !id.is_null() => stringify(id),
        _ => {
            let mut hasher = DefaultHasher::new();
            serde_json::to_string(row)
                .unwrap_or_default()
                .hash(&mut hasher);
            format!("{}-{:016x}", position, hasher.finish())
        }
    }
}
