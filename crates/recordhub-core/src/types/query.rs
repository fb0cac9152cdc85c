//! Select query description handed to a [`DataStore`](crate::traits::DataStore).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::FilterField;
use super::pagination::RowRange;
use super::sorting::SortField;

/// A generic row: a JSON object keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Longest identifier Postgres accepts without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Returns whether `name` is a plain SQL identifier
/// (`[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A projection-select against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Collection (table) name.
    pub collection: String,
    /// `*` or a comma-separated column list.
    pub projection: String,
    /// Conditions joined with AND.
    pub filters: Vec<FilterField>,
    /// Optional ordering.
    pub order: Option<SortField>,
    /// Optional inclusive row range.
    pub range: Option<RowRange>,
}

impl SelectQuery {
    /// Starts a `SELECT *` on the given collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            projection: "*".to_string(),
            filters: Vec::new(),
            order: None,
            range: None,
        }
    }

    /// Sets the projection.
    pub fn select(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    /// Adds a filter.
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds an equality filter.
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(FilterField::eq(field, value))
    }

    /// Sets the ordering.
    pub fn order(mut self, sort: SortField) -> Self {
        self.order = Some(sort);
        self
    }

    /// Sets the row range.
    pub fn range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Returns the projected column names, or `None` for `*`.
    pub fn projected_columns(&self) -> Option<Vec<&str>> {
        let projection = self.projection.trim();
        if projection == "*" {
            return None;
        }
        Some(projection.split(',').map(str::trim).collect())
    }

    /// Returns whether a row satisfies every filter.
    pub fn matches(&self, row: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}
