//! Loading rows from JSON array and JSON Lines files.

use crate::row::Row;
use crate::RowFormat;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::Value;
use std::path::Path;

/// Read rows from `path`. The format is `format` when given, otherwise the
/// file extension decides, falling back to a JSON array.
pub fn load_rows(path: &Path, format: Option<RowFormat>) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre!("Failed to read rows from {}: {}", path.display(), e))?;
    let format = format
        .or_else(|| RowFormat::from_path(path))
        .unwrap_or(RowFormat::Json);
    let rows = match format {
        RowFormat::Json => parse_json_array(&content),
        RowFormat::Jsonl => parse_json_lines(&content),
    }
    .map_err(|e| eyre!("{}: {}", path.display(), e))?;
    log::info!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn parse_json_array(content: &str) -> Result<Vec<Row>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| eyre!("invalid JSON: {}", e))?;
    let Value::Array(items) = value else {
        return Err(eyre!("expected a JSON array of objects"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(eyre!(
                "entry {} is {}, expected an object",
                i,
                kind_name(&other)
            )),
        })
        .collect()
}

/// One object per line; blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_json_lines(content: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| eyre!("line {}: invalid JSON: {}", i + 1, e))?;
        match value {
            Value::Object(row) => rows.push(row),
            other => {
                return Err(eyre!(
                    "line {}: found {}, expected an object",
                    i + 1,
                    kind_name(&other)
                ))
            }
        }
    }
    Ok(rows)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let rows = parse_json_array(r#"[{"a": 1}, {"a": 2, "b": [1, 2]}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["b"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_parse_json_array_rejects_non_objects() {
        let err = parse_json_array(r#"[{"a": 1}, 3]"#).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
        assert!(parse_json_array(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_parse_json_lines() {
        let rows = parse_json_lines("{\"a\": 1}\n\n  {\"a\": 2}\n").unwrap();
        assert_eq!(rows.len(), 2);
        let err = parse_json_lines("{\"a\": 1}\n[1]\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
