pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The record a formatter should show: the envelope's `result` when present.
pub(crate) fn primary(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Nested objects become dotted keys (`operating_expenses.taxes`).
/// Arrays of objects are left out; they are rendered as their own tables.
pub(crate) fn flatten(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", map, &mut rows);
    rows
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, rows: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows),
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            other => rows.push((name, scalar(other))),
        }
    }
}

/// Named arrays of records inside an object, e.g. a projection's `periods`.
pub(crate) fn record_arrays(map: &Map<String, Value>) -> Vec<(&str, &[Value])> {
    map.iter()
        .filter_map(|(k, v)| match v {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                Some((k.as_str(), items.as_slice()))
            }
            Value::Object(inner) => inner.get("periods").and_then(|p| match p {
                Value::Array(items) => Some((k.as_str(), items.as_slice())),
                _ => None,
            }),
            _ => None,
        })
        .collect()
}

pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers from the first record, in its key order.
pub(crate) fn headers(records: &[Value]) -> Vec<String> {
    match records.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn row(record: &Value, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| record.get(h.as_str()).map(scalar).unwrap_or_default())
        .collect()
}
