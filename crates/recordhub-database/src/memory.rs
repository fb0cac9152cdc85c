//! In-process data store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use recordhub_core::error::AppError;
use recordhub_core::result::AppResult;
use recordhub_core::traits::clock::{Clock, SystemClock};
use recordhub_core::traits::storage::DataStore;
use recordhub_core::types::filter::FilterField;
use recordhub_core::types::query::{Record, SelectQuery};
use recordhub_core::types::sorting::SortDirection;

use crate::projection::{check_projection, compare_values, project};

/// Process-local tables keyed by collection name.
///
/// Clones share the same tables, so a clone can serve as a second handle
/// (e.g. the service handle used in development mode).
#[derive(Debug, Clone)]
pub struct MemoryDataStore {
    /// Collection name to rows, in insertion order.
    tables: Arc<RwLock<HashMap<String, Vec<Record>>>>,
    /// Source of `created_at` / `updated_at` stamps.
    clock: Arc<dyn Clock>,
    /// Number of successful insert/update/delete calls.
    writes: Arc<AtomicU64>,
}

impl MemoryDataStore {
    /// Creates an empty store using the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store with an explicit time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            clock,
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Inserts rows verbatim, without stamping ids or timestamps and
    /// without counting as writes.
    pub async fn seed(&self, collection: &str, rows: Vec<Record>) {
        let mut tables = self.tables.write().await;
        tables.entry(collection.to_string()).or_default().extend(rows);
    }

    /// Snapshot of every row in a collection.
    pub async fn rows(&self, collection: &str) -> Vec<Record> {
        let tables = self.tables.read().await;
        tables.get(collection).cloned().unwrap_or_default()
    }

    /// Number of successful insert/update/delete calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn now_string(&self) -> String {
        self.clock.now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_scope(row: &Record, scope: &[FilterField]) -> bool {
    scope.iter().all(|f| f.matches(row))
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn select(&self, query: &SelectQuery) -> AppResult<Vec<Record>> {
        check_projection(&query.projection)?;
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Record> = rows.iter().filter(|row| query.matches(row)).collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let left = a.get(&order.field).unwrap_or(&Value::Null);
                let right = b.get(&order.field).unwrap_or(&Value::Null);
                let ord = compare_values(left, right);
                match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let selected: Vec<Record> = match query.range {
            Some(range) => matched
                .into_iter()
                .skip(range.from as usize)
                .take(range.len() as usize)
                .map(|row| project(row, &query.projection))
                .collect(),
            None => matched
                .into_iter()
                .map(|row| project(row, &query.projection))
                .collect(),
        };

        debug!(
            collection = %query.collection,
            filters = query.filters.len(),
            rows = selected.len(),
            "Memory select"
        );
        Ok(selected)
    }

    async fn insert(&self, collection: &str, mut row: Record, projection: &str) -> AppResult<Record> {
        check_projection(projection)?;
        let now = self.now_string();

        let has_id = row.get("id").is_some_and(|v| !v.is_null());
        if !has_id {
            row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        if row.get("created_at").is_none_or(Value::is_null) {
            row.insert("created_at".to_string(), Value::String(now.clone()));
        }
        row.insert("updated_at".to_string(), Value::String(now));

        let mut tables = self.tables.write().await;
        let rows = tables.entry(collection.to_string()).or_default();
        if has_id && rows.iter().any(|existing| existing.get("id") == row.get("id")) {
            return Err(AppError::storage(format!(
                "Duplicate key value violates unique constraint on {collection}.id"
            )));
        }
        rows.push(row.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(project(&row, projection))
    }

    async fn update(
        &self,
        collection: &str,
        scope: &[FilterField],
        patch: Record,
        projection: &str,
    ) -> AppResult<Record> {
        check_projection(projection)?;
        let now = self.now_string();

        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(collection).map(Vec::as_mut_slice).unwrap_or_default();

        let mut first: Option<Record> = None;
        for row in rows.iter_mut().filter(|row| matches_scope(row, scope)) {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            row.insert("updated_at".to_string(), Value::String(now.clone()));
            if first.is_none() {
                first = Some(row.clone());
            }
        }

        match first {
            Some(row) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(project(&row, projection))
            }
            None => Err(AppError::not_found(format!(
                "No rows in '{collection}' matched the update scope"
            ))),
        }
    }

    async fn delete(&self, collection: &str, scope: &[FilterField]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(collection) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !matches_scope(row, scope));
        let removed = (before - rows.len()) as u64;
        if removed > 0 {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}
