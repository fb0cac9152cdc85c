//! Operation set builder.

use std::sync::Arc;

use tracing::info;

use recordhub_auth::TenantResolver;
use recordhub_cache::IdempotencyManager;
use recordhub_core::config::{FactoryConfig, IdempotencyConfig};
use recordhub_core::error::AppError;
use recordhub_core::result::AppResult;
use recordhub_core::traits::clock::{Clock, SystemClock};
use recordhub_core::traits::revalidate::Revalidator;
use recordhub_hooks::HookSet;

use crate::notifier::RevalidationNotifier;
use crate::operations::{CrudOperations, RecordType};
use crate::validation::Schema;

/// Collects everything an operation set closes over.
///
/// Defaults: [`FactoryConfig::default`], no hooks, a private in-memory
/// idempotency store with a five minute TTL, no revalidator, wall clock.
pub struct CrudFactory<T, I, U> {
    collection: String,
    insert_schema: I,
    update_schema: U,
    config: FactoryConfig,
    hooks: HookSet<T>,
    idempotency: Option<IdempotencyManager>,
    revalidator: Option<Arc<dyn Revalidator>>,
    clock: Arc<dyn Clock>,
}

impl<T, I, U> CrudFactory<T, I, U>
where
    T: RecordType,
    I: Schema,
    U: Schema,
{
    /// Starts a factory for `collection`.
    pub fn new(collection: impl Into<String>, insert_schema: I, update_schema: U) -> Self {
        Self {
            collection: collection.into(),
            insert_schema,
            update_schema,
            config: FactoryConfig::default(),
            hooks: HookSet::new(),
            idempotency: None,
            revalidator: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the factory configuration.
    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the lifecycle hooks.
    pub fn hooks(mut self, hooks: HookSet<T>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Uses an explicit idempotency store instead of a private one.
    pub fn idempotency(mut self, manager: IdempotencyManager) -> Self {
        self.idempotency = Some(manager);
        self
    }

    /// Sets the downstream revalidator.
    pub fn revalidator(mut self, revalidator: Arc<dyn Revalidator>) -> Self {
        self.revalidator = Some(revalidator);
        self
    }

    /// Sets the time source used for context timestamps and `archived_at`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates the configuration and produces the operation set.
    pub fn build(self, resolver: TenantResolver) -> AppResult<CrudOperations<T, I, U>> {
        self.config.validate_for(&self.collection)?;
        if self.config.use_profile_lookup && !resolver.has_profile_lookup() {
            return Err(AppError::configuration(format!(
                "Collection '{}' uses profile lookup but the resolver has none",
                self.collection
            )));
        }

        let idempotency = match self.idempotency {
            Some(manager) => manager,
            None => IdempotencyManager::new(&IdempotencyConfig::default())?,
        };
        let notifier = RevalidationNotifier::new(
            self.revalidator,
            self.config.resolved_revalidate_paths(&self.collection),
        );

        info!(
            collection = %self.collection,
            soft_delete = self.config.has_soft_delete,
            profile_lookup = self.config.use_profile_lookup,
            hooks = ?self.hooks.registered(),
            "Operation set built"
        );

        Ok(CrudOperations {
            collection: self.collection,
            config: self.config,
            insert_schema: Arc::new(self.insert_schema),
            update_schema: Arc::new(self.update_schema),
            hooks: Arc::new(self.hooks),
            resolver,
            idempotency,
            notifier,
            clock: self.clock,
        })
    }
}
