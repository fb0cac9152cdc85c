//! Row projection and ordering helpers shared by the stores.

use std::cmp::Ordering;

use serde_json::Value;

use recordhub_core::error::AppError;
use recordhub_core::types::query::{Record, is_identifier};

/// Validates a projection string: `*` or comma-separated identifiers.
pub fn check_projection(projection: &str) -> Result<(), AppError> {
    let trimmed = projection.trim();
    if trimmed == "*" {
        return Ok(());
    }
    if trimmed.is_empty() || !trimmed.split(',').all(|c| is_identifier(c.trim())) {
        return Err(AppError::storage(format!("Invalid projection '{projection}'")));
    }
    Ok(())
}

/// Keeps only the projected columns of a row. `*` keeps everything.
pub fn project(row: &Record, projection: &str) -> Record {
    let trimmed = projection.trim();
    if trimmed == "*" {
        return row.clone();
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter_map(|column| row.get(column).map(|v| (column.to_string(), v.clone())))
        .collect()
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array
/// < object; values of the same type compare naturally.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
