//! Text input helpers for value editors
//!
//! Rendering layers capture raw text; these turn it into condition values
//! and back. Text that does not fit the field type yields `None`.

use crate::FieldType;
use serde_json::{Number, Value};

/// Parse one typed value from text.
pub fn parse_scalar_input(field_type: FieldType, text: &str) -> Option<Value> {
    match field_type {
        FieldType::String | FieldType::Date => Some(Value::String(text.to_string())),
        FieldType::Number => parse_number(text.trim()),
        FieldType::Boolean => match text.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Split comma-separated text into a list of trimmed strings, as the
/// `in`/`not_in` editors do. Elements stay strings.
pub fn parse_list_input(text: &str) -> Value {
    Value::Array(
        text.split(',')
            .map(|part| Value::String(part.trim().to_string()))
            .collect(),
    )
}

/// Build a `between` value from its two bounds; a missing bound is `null`.
pub fn between_value(low: Option<Value>, high: Option<Value>) -> Value {
    Value::Array(vec![
        low.unwrap_or(Value::Null),
        high.unwrap_or(Value::Null),
    ])
}

/// Render a value back into editor text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
