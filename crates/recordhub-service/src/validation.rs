//! Input normalization and schema application.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use recordhub_core::error::{AppError, ValidationIssue, flatten_validation_errors};
use recordhub_core::result::AppResult;
use recordhub_core::types::query::Record;

/// A predicate over raw JSON input that yields a typed value or a list of
/// issues.
pub trait Schema: Send + Sync + 'static {
    /// The accepted value.
    type Output: Serialize + Send + Sync + 'static;

    /// Accepts or rejects `value`.
    fn parse(&self, value: Value) -> Result<Self::Output, Vec<ValidationIssue>>;
}

/// Schema backed by a `serde` + `validator` type.
///
/// Update shapes should mark optional fields with
/// `#[serde(skip_serializing_if = "Option::is_none")]`, otherwise absent
/// fields are written back as nulls.
pub struct ValidatedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValidatedSchema<T> {
    /// Creates the schema.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ValidatedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ValidatedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedSchema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Schema for ValidatedSchema<T>
where
    T: DeserializeOwned + Validate + Serialize + Send + Sync + 'static,
{
    type Output = T;

    fn parse(&self, value: Value) -> Result<T, Vec<ValidationIssue>> {
        let parsed: T = serde_json::from_value(value)
            .map_err(|e| vec![ValidationIssue::new("", "type", e.to_string())])?;
        parsed.validate().map_err(|errors| {
            let mut issues = Vec::new();
            flatten_validation_errors("", &errors, &mut issues);
            issues
        })?;
        Ok(parsed)
    }
}

/// Accepts any JSON object unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSchema;

impl Schema for PassthroughSchema {
    type Output = Value;

    fn parse(&self, value: Value) -> Result<Value, Vec<ValidationIssue>> {
        if value.is_object() {
            Ok(value)
        } else {
            Err(vec![ValidationIssue::new("", "type", "expected an object")])
        }
    }
}

/// Whether `key` names an identifier field: `id`, `*_id` or `*Id`.
fn is_identifier_field(key: &str) -> bool {
    key == "id" || key.ends_with("_id") || key.ends_with("Id")
}

/// Rewrites empty-string identifier fields to null.
pub fn normalize_identifiers(value: &mut Value) {
    if let Value::Object(map) = value {
        for (key, field) in map.iter_mut() {
            if is_identifier_field(key) && field.as_str() == Some("") {
                *field = Value::Null;
            }
        }
    }
}

/// Sets the owner column on an object payload, replacing any supplied
/// value.
pub fn inject_owner(value: &mut Value, owner_column: &str, owner_id: &str) -> AppResult<()> {
    match value {
        Value::Object(map) => {
            map.insert(owner_column.to_string(), Value::String(owner_id.to_string()));
            Ok(())
        }
        _ => Err(AppError::validation(
            "Input must be an object",
            vec![ValidationIssue::new("", "type", "expected an object")],
        )),
    }
}

/// Normalizes `raw` and applies `schema`.
pub fn validate<S: Schema>(schema: &S, mut raw: Value) -> AppResult<S::Output> {
    normalize_identifiers(&mut raw);
    schema
        .parse(raw)
        .map_err(|issues| AppError::validation("Validation failed", issues))
}

/// Serializes a validated value into a storage row.
pub fn into_record<V: Serialize>(value: &V) -> AppResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::validation(
            "Validated input is not an object",
            vec![ValidationIssue::new("", "type", "expected an object")],
        )),
    }
}
