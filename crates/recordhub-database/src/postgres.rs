//! PostgreSQL data store.
//!
//! Rows travel as JSON: results come back through `to_jsonb`, and payloads
//! are mapped onto the table's column types with `jsonb_populate_record`,
//! so uuid, timestamptz and numeric columns accept plain JSON values.
//! Collection and column names are interpolated as quoted identifiers and
//! must pass [`is_identifier`]; every value is a bound parameter.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, Postgres};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row};
use tracing::{debug, info};

use recordhub_core::config::DatabaseConfig;
use recordhub_core::error::{AppError, ErrorKind};
use recordhub_core::result::AppResult;
use recordhub_core::traits::storage::DataStore;
use recordhub_core::types::filter::{FilterField, FilterOp};
use recordhub_core::types::query::{Record, SelectQuery, is_identifier};

use crate::projection::{check_projection, project};

/// sqlx-backed [`DataStore`].
#[derive(Debug, Clone)]
pub struct PgDataStore {
    pool: PgPool,
}

impl PgDataStore {
    /// Create a new store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool described by `config` and serves collections from it.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(config)?;
        let pool = &config.pool;
        info!(
            url = %config.redacted_url(),
            max_connections = pool.max_connections,
            min_connections = pool.min_connections,
            statement_timeout_ms = config.statement_timeout_ms,
            "Connecting Postgres data store"
        );

        let pg = PgPoolOptions::new()
            .max_connections(pool.max_connections)
            .min_connections(pool.min_connections)
            .acquire_timeout(Duration::from_secs(pool.acquire_timeout_seconds))
            .idle_timeout(pool.idle_timeout_seconds.map(Duration::from_secs))
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to Postgres", e))?;

        info!("Postgres data store ready");
        Ok(Self::new(pg))
    }
}

fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    let pool = &config.pool;
    if pool.max_connections == 0 || pool.min_connections > pool.max_connections {
        return Err(AppError::configuration(format!(
            "Invalid pool size: min_connections={} max_connections={}",
            pool.min_connections, pool.max_connections
        )));
    }

    let options: PgConnectOptions = config.url.parse().map_err(|e: sqlx::Error| {
        AppError::with_source(
            ErrorKind::Configuration,
            format!("Invalid database URL '{}': {e}", config.redacted_url()),
            e,
        )
    })?;
    let options = options.application_name(&config.application_name);
    if config.statement_timeout_ms == 0 {
        Ok(options)
    } else {
        Ok(options.options([(
            "statement_timeout",
            config.statement_timeout_ms.to_string(),
        )]))
    }
}

fn ident(name: &str) -> AppResult<String> {
    if is_identifier(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(AppError::storage(format!("Invalid identifier '{name}'")))
    }
}

fn storage_error(context: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Storage, format!("{context}: {err}"), err)
}

fn decode_row(row: &sqlx::postgres::PgRow) -> AppResult<Record> {
    let Json(value): Json<Value> = row
        .try_get("row")
        .map_err(|e| storage_error("Failed to decode row", e))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::storage(format!("Expected a JSON object row, got {other}"))),
    }
}

/// Appends ` WHERE a AND b ...` for the given filters.
fn push_where(
    builder: &mut QueryBuilder<'static, Postgres>,
    table: &str,
    filters: &[FilterField],
) -> AppResult<()> {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        let column = ident(&filter.field)?;
        match filter.op {
            FilterOp::IsNull => {
                builder.push(format!("{column} IS NULL"));
            }
            FilterOp::Eq if filter.value.is_null() => {
                builder.push(format!("{column} IS NULL"));
            }
            FilterOp::Eq => {
                // The right-hand side is a constant, so an index on the
                // column stays usable.
                builder.push(format!(
                    "{column} = (jsonb_populate_record(NULL::{table}, jsonb_build_object('{}', ",
                    filter.field
                ));
                builder.push_bind(Json(filter.value.clone()));
                builder.push(format!("::jsonb))).{column}"));
            }
        }
    }
    Ok(())
}

fn build_select(query: &SelectQuery) -> AppResult<QueryBuilder<'static, Postgres>> {
    check_projection(&query.projection)?;
    let table = ident(&query.collection)?;
    let row = match query.projected_columns() {
        None => "to_jsonb(t)".to_string(),
        Some(columns) => {
            let pairs = columns
                .into_iter()
                .map(|column| Ok(format!("'{column}', t.{}", ident(column)?)))
                .collect::<AppResult<Vec<_>>>()?
                .join(", ");
            format!("jsonb_build_object({pairs})")
        }
    };

    let mut builder = QueryBuilder::new(format!("SELECT {row} AS row FROM {table} t"));
    push_where(&mut builder, &table, &query.filters)?;

    if let Some(order) = &query.order {
        builder.push(format!(
            " ORDER BY t.{} {}",
            ident(&order.field)?,
            order.direction.as_sql()
        ));
    }
    if let Some(range) = query.range {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(range.len()).unwrap_or(i64::MAX));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(range.from).unwrap_or(i64::MAX));
    }
    Ok(builder)
}

fn build_insert(collection: &str, row: &Record) -> AppResult<QueryBuilder<'static, Postgres>> {
    let table = ident(collection)?;
    if row.is_empty() {
        return Ok(QueryBuilder::new(format!(
            "INSERT INTO {table} DEFAULT VALUES RETURNING to_jsonb({table}.*) AS row"
        )));
    }
    let columns = row
        .keys()
        .map(|k| ident(k))
        .collect::<AppResult<Vec<_>>>()?
        .join(", ");

    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{table}, "
    ));
    builder.push_bind(Json(Value::Object(row.clone())));
    builder.push(format!(") RETURNING to_jsonb({table}.*) AS row"));
    Ok(builder)
}

fn build_update(
    collection: &str,
    scope: &[FilterField],
    patch: &Record,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let table = ident(collection)?;
    let columns = patch
        .keys()
        .map(|k| ident(k))
        .collect::<AppResult<Vec<_>>>()?
        .join(", ");

    let mut builder = QueryBuilder::new(format!(
        "UPDATE {table} SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, "
    ));
    builder.push_bind(Json(Value::Object(patch.clone())));
    builder.push("))");
    push_where(&mut builder, &table, scope)?;
    builder.push(format!(" RETURNING to_jsonb({table}.*) AS row"));
    Ok(builder)
}

fn build_delete(collection: &str, scope: &[FilterField]) -> AppResult<QueryBuilder<'static, Postgres>> {
    let table = ident(collection)?;
    let mut builder = QueryBuilder::new(format!("DELETE FROM {table}"));
    push_where(&mut builder, &table, scope)?;
    Ok(builder)
}

#[async_trait]
impl DataStore for PgDataStore {
    async fn select(&self, query: &SelectQuery) -> AppResult<Vec<Record>> {
        let mut builder = build_select(query)?;
        debug!(collection = %query.collection, sql = %builder.sql(), "Postgres select");
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to select rows", e))?;
        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, collection: &str, row: Record, projection: &str) -> AppResult<Record> {
        check_projection(projection)?;
        let mut builder = build_insert(collection, &row)?;
        let stored = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to insert row", e))?;
        Ok(project(&decode_row(&stored)?, projection))
    }

    async fn update(
        &self,
        collection: &str,
        scope: &[FilterField],
        patch: Record,
        projection: &str,
    ) -> AppResult<Record> {
        check_projection(projection)?;
        if patch.is_empty() {
            let query = SelectQuery {
                collection: collection.to_string(),
                projection: projection.to_string(),
                filters: scope.to_vec(),
                order: None,
                range: None,
            };
            return self.select_one(&query).await?.ok_or_else(|| {
                AppError::not_found(format!("No rows in '{collection}' matched the update scope"))
            });
        }

        let mut builder = build_update(collection, scope, &patch)?;
        let updated = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to update row", e))?;
        match updated {
            Some(row) => Ok(project(&decode_row(&row)?, projection)),
            None => Err(AppError::not_found(format!(
                "No rows in '{collection}' matched the update scope"
            ))),
        }
    }

    async fn delete(&self, collection: &str, scope: &[FilterField]) -> AppResult<u64> {
        let mut builder = build_delete(collection, scope)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete rows", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordhub_core::types::pagination::RowRange;
    use recordhub_core::types::sorting::SortField;
    use serde_json::json;

    #[test]
    fn test_select_sql() {
        let query = SelectQuery::new("contacts")
            .select("id, name")
            .eq("owner_id", "u1")
            .filter(FilterField::is_null("archived_at"))
            .order(SortField::desc("created_at"))
            .range(RowRange { from: 10, to: 19 });
        let builder = build_select(&query).unwrap();
        assert_eq!(
            builder.sql(),
            "SELECT jsonb_build_object('id', t.\"id\", 'name', t.\"name\") AS row \
             FROM \"contacts\" t WHERE \"owner_id\" = (jsonb_populate_record(NULL::\"contacts\", \
             jsonb_build_object('owner_id', $1::jsonb))).\"owner_id\" \
             AND \"archived_at\" IS NULL ORDER BY t.\"created_at\" DESC LIMIT $2 OFFSET $3"
        );

        let all = build_select(&SelectQuery::new("contacts")).unwrap();
        assert_eq!(all.sql(), "SELECT to_jsonb(t) AS row FROM \"contacts\" t");
    }

    #[test]
    fn test_select_with_unbounded_range() {
        let query = SelectQuery::new("contacts").range(RowRange {
            from: u64::MAX - 1,
            to: u64::MAX,
        });
        let builder = build_select(&query).unwrap();
        assert!(builder.sql().ends_with(" LIMIT $1 OFFSET $2"));
        assert_eq!(RowRange { from: 0, to: u64::MAX }.len(), u64::MAX);
        assert_eq!(i64::try_from(u64::MAX).unwrap_or(i64::MAX), i64::MAX);
    }

    #[test]
    fn test_connect_options_reject_bad_settings() {
        let mut config = DatabaseConfig::new("postgres://app:pw@localhost:5432/records");
        assert!(connect_options(&config).is_ok());

        config.pool.min_connections = 20;
        let err = connect_options(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let err = connect_options(&DatabaseConfig::new("not a database url")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_insert_sql() {
        let row = json!({"name": "Jane", "owner_id": "u1"});
        let builder = build_insert("contacts", row.as_object().unwrap()).unwrap();
        assert_eq!(
            builder.sql(),
            "INSERT INTO \"contacts\" (\"name\", \"owner_id\") SELECT \"name\", \"owner_id\" \
             FROM jsonb_populate_record(NULL::\"contacts\", $1) \
             RETURNING to_jsonb(\"contacts\".*) AS row"
        );
    }

    #[test]
    fn test_update_sql() {
        let patch = json!({"status": "archived"});
        let scope = [FilterField::eq("id", "r1")];
        let builder = build_update("contacts", &scope, patch.as_object().unwrap()).unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE \"contacts\" SET (\"status\") = (SELECT \"status\" FROM \
             jsonb_populate_record(NULL::\"contacts\", $1)) WHERE \"id\" = \
             (jsonb_populate_record(NULL::\"contacts\", jsonb_build_object('id', $2::jsonb))).\"id\" \
             RETURNING to_jsonb(\"contacts\".*) AS row"
        );
    }

    #[test]
    fn test_delete_sql_and_identifier_guard() {
        let scope = [FilterField::eq("id", Value::Null)];
        let builder = build_delete("contacts", &scope).unwrap();
        assert_eq!(builder.sql(), "DELETE FROM \"contacts\" WHERE \"id\" IS NULL");

        let err = build_delete("contacts; drop", &scope).err().expect("expected identifier guard error");
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
