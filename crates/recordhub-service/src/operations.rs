//! The generated operation set.
//!
//! Mutations run in a fixed order: caller identification, idempotency
//! short-circuit, tenant scoping, validation, before hook, storage call,
//! after hook, revalidation, idempotency write. Idempotency keys carry the
//! caller's identity, so a token only ever replays its own caller's
//! result.
//!
//! A failing before hook aborts before any storage access. A failing after
//! hook is returned to the caller although the mutation has already
//! committed; callers should read it as "committed, side effects may be
//! incomplete".
//!
//! Every id-based operation is scoped by `id` and the owner column in the
//! same query, so a foreign record and a missing one both surface as
//! `NotFound`.

use std::fmt;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use recordhub_auth::{Caller, TenantResolver, TenantScope};
use recordhub_cache::IdempotencyManager;
use recordhub_core::config::FactoryConfig;
use recordhub_core::error::{AppError, ValidationIssue};
use recordhub_core::result::AppResult;
use recordhub_core::traits::clock::Clock;
use recordhub_core::traits::idempotency::IdempotencyStore;
use recordhub_core::traits::storage::DataStore;
use recordhub_core::types::filter::FilterField;
use recordhub_core::types::pagination::{PageRequest, RowRange};
use recordhub_core::types::query::{Record, SelectQuery, is_identifier};
use recordhub_core::types::sorting::{SortDirection, SortField};
use recordhub_hooks::{
    HookPoint, HookSet, OperationContext, OperationContextBuilder, OperationKind,
};

use crate::notifier::RevalidationNotifier;
use crate::validation::{self, Schema, inject_owner, into_record};

const ID_COLUMN: &str = "id";
const ARCHIVED_AT_COLUMN: &str = "archived_at";
const STATUS_COLUMN: &str = "status";
const STATUS_ACTIVE: &str = "active";
const STATUS_ARCHIVED: &str = "archived";

/// Record types an operation set can return.
pub trait RecordType: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> RecordType for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Parameters for [`CrudOperations::list`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Equality filters, joined with AND.
    pub filters: Vec<(String, Value)>,
    /// Ordering; the configured default sort when `None`.
    pub sort: Option<SortField>,
    /// Page size. Only applied together with `offset`.
    pub limit: Option<u64>,
    /// Rows to skip. Only applied together with `limit`.
    pub offset: Option<u64>,
    /// Overrides the configured archived-row visibility.
    pub include_archived: Option<bool>,
}

impl ListOptions {
    /// No filters, default sort, no pagination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Sets the ordering.
    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of rows to skip.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets archived-row visibility for this call.
    pub fn include_archived(mut self, include: bool) -> Self {
        self.include_archived = Some(include);
        self
    }

    /// Sets limit and offset from a 1-based page request.
    pub fn with_page(self, page: PageRequest) -> Self {
        self.limit(page.limit()).offset(page.offset())
    }
}

/// List, get, create, update, delete, archive and unarchive for one
/// collection.
///
/// Built by [`CrudFactory`](crate::factory::CrudFactory). Clones share the
/// hook set and the idempotency store.
pub struct CrudOperations<T, I, U> {
    pub(crate) collection: String,
    pub(crate) config: FactoryConfig,
    pub(crate) insert_schema: Arc<I>,
    pub(crate) update_schema: Arc<U>,
    pub(crate) hooks: Arc<HookSet<T>>,
    pub(crate) resolver: TenantResolver,
    pub(crate) idempotency: IdempotencyManager,
    pub(crate) notifier: RevalidationNotifier,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<T, I, U> Clone for CrudOperations<T, I, U> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            config: self.config.clone(),
            insert_schema: Arc::clone(&self.insert_schema),
            update_schema: Arc::clone(&self.update_schema),
            hooks: Arc::clone(&self.hooks),
            resolver: self.resolver.clone(),
            idempotency: self.idempotency.clone(),
            notifier: self.notifier.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, I, U> fmt::Debug for CrudOperations<T, I, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudOperations")
            .field("collection", &self.collection)
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish()
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl<T, I, U> CrudOperations<T, I, U>
where
    T: RecordType,
    I: Schema,
    U: Schema,
{
    /// Collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Resolved factory configuration.
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Lists the caller's records.
    ///
    /// Archived rows are excluded unless requested or configured. The row
    /// range is applied only when both `limit` and `offset` are given; a
    /// zero limit returns nothing.
    pub async fn list(&self, options: ListOptions) -> AppResult<Vec<T>> {
        let tenant = self.resolve().await?;
        let ctx = OperationContext::builder(OperationKind::Read, &self.collection)
            .user_id(&tenant.owner_id)
            .timestamp(self.clock.now())
            .build();
        self.hooks.run_before_read(&ctx).await?;

        let mut query = SelectQuery::new(&self.collection)
            .select(&self.config.select_query)
            .eq(&self.config.owner_id_column, tenant.owner_id.as_str());

        let include_archived = options
            .include_archived
            .unwrap_or(self.config.include_archived);
        if self.config.has_soft_delete && !include_archived {
            query = query.filter(FilterField::is_null(ARCHIVED_AT_COLUMN));
        }

        for (field, value) in options.filters {
            check_column(&field, "filters")?;
            query = query.eq(field, value);
        }

        let sort = match options.sort {
            Some(sort) => {
                check_column(&sort.field, "sort")?;
                sort
            }
            None => SortField::new(
                &self.config.default_sort.column,
                SortDirection::from_ascending(self.config.default_sort.ascending),
            ),
        };
        query = query.order(sort);

        if let (Some(limit), Some(offset)) = (options.limit, options.offset) {
            match RowRange::from_limit_offset(limit, offset) {
                Some(range) => query = query.range(range),
                None => return Ok(Vec::new()),
            }
        }

        let rows = tenant.store.select(&query).await?;
        debug!(collection = %self.collection, rows = rows.len(), "Listed records");
        rows.into_iter().map(decode).collect()
    }

    /// Fetches one of the caller's records.
    pub async fn get_one(&self, id: &str) -> AppResult<T> {
        let tenant = self.resolve().await?;
        match self.fetch(&tenant, id).await? {
            Some(record) => Ok(record),
            None => Err(self.not_found(id)),
        }
    }

    /// Creates a record owned by the caller.
    ///
    /// With an idempotency key that already holds a fresh result for the
    /// same caller, that result is returned without validation, hooks or
    /// storage access. An anonymous caller is rejected before the lookup.
    pub async fn create(&self, input: Value, idempotency_key: Option<&str>) -> AppResult<T> {
        let caller = self.resolver.identify().await?;
        if let Some(hit) = self.cached(&caller, idempotency_key).await? {
            return Ok(hit);
        }

        let tenant = self
            .resolver
            .scope(caller.clone(), self.config.use_profile_lookup)
            .await?;
        let owner_column = &self.config.owner_id_column;

        let mut input = input;
        inject_owner(&mut input, owner_column, &tenant.owner_id)?;
        let validated = validation::validate(self.insert_schema.as_ref(), input)?;
        let mut row = into_record(&validated)?;
        row.insert(owner_column.clone(), Value::String(tenant.owner_id.clone()));
        if self.config.has_soft_delete {
            row.insert(STATUS_COLUMN.to_string(), Value::from(STATUS_ACTIVE));
            row.insert(ARCHIVED_AT_COLUMN.to_string(), Value::Null);
        }

        let started_at = self.clock.now();
        let ctx = self
            .context(OperationKind::Create, &tenant, None, idempotency_key)
            .timestamp(started_at)
            .build();
        self.hooks
            .run_before_create(&Value::Object(row.clone()), &ctx)
            .await?;

        let stored = tenant
            .store
            .insert(&self.collection, row, &self.config.select_query)
            .await?;
        let record_id = id_string(stored.get(ID_COLUMN));
        let record: T = decode(stored)?;

        let after_ctx = self
            .context(OperationKind::Create, &tenant, record_id.as_deref(), idempotency_key)
            .timestamp(started_at)
            .build();
        self.hooks.run_after_create(&record, &after_ctx).await?;

        info!(
            collection = %self.collection,
            record_id = ?record_id,
            owner_id = %tenant.owner_id,
            "Record created"
        );
        self.notifier.notify().await;
        self.remember(&caller, idempotency_key, &record).await;
        Ok(record)
    }

    /// Updates one of the caller's records.
    ///
    /// The owner column and, with soft delete, `status`/`archived_at` are
    /// stripped from the patch. When an `after_update` hook is registered
    /// the previous record is read first; that read and the write are not
    /// one transaction, so a concurrent writer can make the previous value
    /// stale.
    pub async fn update(
        &self,
        id: &str,
        input: Value,
        idempotency_key: Option<&str>,
    ) -> AppResult<T> {
        let caller = self.resolver.identify().await?;
        if let Some(hit) = self.cached(&caller, idempotency_key).await? {
            return Ok(hit);
        }

        let tenant = self
            .resolver
            .scope(caller.clone(), self.config.use_profile_lookup)
            .await?;
        let validated = validation::validate(self.update_schema.as_ref(), input)?;
        let mut patch = into_record(&validated)?;
        patch.remove(ID_COLUMN);
        patch.remove(&self.config.owner_id_column);
        if self.config.has_soft_delete {
            patch.remove(STATUS_COLUMN);
            patch.remove(ARCHIVED_AT_COLUMN);
        }

        let ctx = self
            .context(OperationKind::Update, &tenant, Some(id), idempotency_key)
            .build();

        let previous = if self.hooks.has(HookPoint::AfterUpdate) {
            self.fetch(&tenant, id).await?
        } else {
            None
        };

        self.hooks
            .run_before_update(&Value::Object(patch.clone()), &ctx)
            .await?;

        let updated = tenant
            .store
            .update(
                &self.collection,
                &self.scope(id, &tenant),
                patch,
                &self.config.select_query,
            )
            .await?;
        let record: T = decode(updated)?;

        self.hooks
            .run_after_update(&record, previous.as_ref(), &ctx)
            .await?;

        info!(collection = %self.collection, record_id = %id, "Record updated");
        self.notifier.notify().await;
        self.remember(&caller, idempotency_key, &record).await;
        Ok(record)
    }

    /// Deletes one of the caller's records.
    ///
    /// With soft delete the record is archived instead. `after_delete`
    /// fires only when the pre-delete read found the record.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let tenant = self.resolve().await?;
        let soft = self.config.has_soft_delete;
        let ctx = self
            .context(OperationKind::Delete, &tenant, Some(id), None)
            .with_string("mode", if soft { "soft" } else { "hard" })
            .build();

        let previous = if self.hooks.has(HookPoint::AfterDelete) {
            self.fetch(&tenant, id).await?
        } else {
            None
        };

        self.hooks.run_before_delete(id, &ctx).await?;

        let scope = self.scope(id, &tenant);
        if soft {
            let archived_at = self.clock.now().to_rfc3339_opts(SecondsFormat::Micros, true);
            let mut patch = Record::new();
            patch.insert(ARCHIVED_AT_COLUMN.to_string(), Value::String(archived_at));
            patch.insert(STATUS_COLUMN.to_string(), Value::from(STATUS_ARCHIVED));
            tenant
                .store
                .update(&self.collection, &scope, patch, ID_COLUMN)
                .await?;
        } else {
            let removed = tenant.store.delete(&self.collection, &scope).await?;
            if removed == 0 {
                return Err(self.not_found(id));
            }
        }

        if let Some(previous) = &previous {
            self.hooks.run_after_delete(previous, &ctx).await?;
        }

        info!(
            collection = %self.collection,
            record_id = %id,
            soft_delete = soft,
            "Record deleted"
        );
        self.notifier.notify().await;
        Ok(())
    }

    /// Archives a record. Same path and hooks as [`delete`](Self::delete).
    pub async fn archive(&self, id: &str) -> AppResult<()> {
        self.require_soft_delete("archive")?;
        self.delete(id).await
    }

    /// Restores an archived record. No lifecycle hooks fire.
    pub async fn unarchive(&self, id: &str) -> AppResult<T> {
        self.require_soft_delete("unarchive")?;
        let tenant = self.resolve().await?;

        let mut patch = Record::new();
        patch.insert(ARCHIVED_AT_COLUMN.to_string(), Value::Null);
        patch.insert(STATUS_COLUMN.to_string(), Value::from(STATUS_ACTIVE));
        let restored = tenant
            .store
            .update(
                &self.collection,
                &self.scope(id, &tenant),
                patch,
                &self.config.select_query,
            )
            .await?;
        let record: T = decode(restored)?;

        info!(collection = %self.collection, record_id = %id, "Record unarchived");
        self.notifier.notify().await;
        Ok(record)
    }

    async fn resolve(&self) -> AppResult<TenantScope> {
        self.resolver.resolve(self.config.use_profile_lookup).await
    }

    fn scope(&self, id: &str, tenant: &TenantScope) -> Vec<FilterField> {
        vec![
            FilterField::eq(ID_COLUMN, id),
            FilterField::eq(&self.config.owner_id_column, tenant.owner_id.as_str()),
        ]
    }

    async fn fetch(&self, tenant: &TenantScope, id: &str) -> AppResult<Option<T>> {
        let query = SelectQuery {
            collection: self.collection.clone(),
            projection: self.config.select_query.clone(),
            filters: self.scope(id, tenant),
            order: None,
            range: None,
        };
        tenant.store.select_one(&query).await?.map(decode).transpose()
    }

    fn context(
        &self,
        operation: OperationKind,
        tenant: &TenantScope,
        id: Option<&str>,
        idempotency_key: Option<&str>,
    ) -> OperationContextBuilder {
        let mut builder = OperationContext::builder(operation, &self.collection)
            .user_id(&tenant.owner_id)
            .timestamp(self.clock.now());
        if let Some(id) = id {
            builder = builder.entity_id(id);
        }
        if let Some(key) = idempotency_key {
            builder = builder.with_string("idempotency_key", key);
        }
        if tenant.development_fallback {
            builder = builder.metadata("development_fallback", Value::Bool(true));
        }
        builder
    }

    async fn cached(
        &self,
        caller: &Caller,
        idempotency_key: Option<&str>,
    ) -> AppResult<Option<T>> {
        let Some(token) = idempotency_key else {
            return Ok(None);
        };
        let key = self
            .idempotency
            .key_for(&self.collection, &caller.identity, token);
        match self.idempotency.lookup(&key).await? {
            Some(value) => {
                debug!(collection = %self.collection, key = %key, "Idempotency hit");
                Ok(Some(serde_json::from_value(value)?))
            }
            None => Ok(None),
        }
    }

    async fn remember(&self, caller: &Caller, idempotency_key: Option<&str>, record: &T) {
        let Some(token) = idempotency_key else {
            return;
        };
        let key = self
            .idempotency
            .key_for(&self.collection, &caller.identity, token);
        let stored = match serde_json::to_value(record) {
            Ok(value) => self.idempotency.store(&key, value).await,
            Err(e) => Err(AppError::from(e)),
        };
        if let Err(e) = stored {
            warn!(
                collection = %self.collection,
                key = %key,
                error = %e,
                "Failed to store idempotent result"
            );
        }
    }

    fn require_soft_delete(&self, operation: &str) -> AppResult<()> {
        if self.config.has_soft_delete {
            Ok(())
        } else {
            Err(AppError::unsupported(format!(
                "'{operation}' requires soft delete, which is disabled for '{}'",
                self.collection
            )))
        }
    }

    fn not_found(&self, id: &str) -> AppError {
        debug!(collection = %self.collection, record_id = %id, "No record in owner scope");
        AppError::not_found(format!("Record '{id}' not found in '{}'", self.collection))
    }
}

fn decode<T: DeserializeOwned>(row: Record) -> AppResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn check_column(name: &str, path: &str) -> AppResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(AppError::validation(
            format!("Invalid column name '{name}'"),
            vec![ValidationIssue::new(path, "identifier", "must be a plain SQL identifier")],
        ))
    }
}
