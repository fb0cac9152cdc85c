//! Idempotency manager that dispatches to the configured store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use recordhub_core::config::idempotency::IdempotencyConfig;
use recordhub_core::error::AppError;
use recordhub_core::result::AppResult;
use recordhub_core::traits::idempotency::IdempotencyStore;

use crate::keys;

/// Idempotency manager wrapping the configured store.
///
/// The store is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct IdempotencyManager {
    /// The inner store.
    inner: Arc<dyn IdempotencyStore>,
    /// Prefix applied to every key.
    key_prefix: String,
}

impl IdempotencyManager {
    /// Create a new manager from configuration.
    pub fn new(config: &IdempotencyConfig) -> AppResult<Self> {
        let ttl = Duration::from_secs(config.ttl_seconds);
        let inner: Arc<dyn IdempotencyStore> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!(ttl_seconds = config.ttl_seconds, "Initializing in-memory idempotency store");
                Arc::new(crate::memory::MemoryIdempotencyStore::new(ttl))
            }
            #[cfg(feature = "bounded")]
            "bounded" => {
                info!(
                    ttl_seconds = config.ttl_seconds,
                    max_capacity = config.max_capacity,
                    "Initializing bounded idempotency store"
                );
                Arc::new(crate::bounded::BoundedIdempotencyStore::new(
                    ttl,
                    config.max_capacity,
                ))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown idempotency provider: '{other}'. Supported: memory, bounded"
                )));
            }
        };

        Ok(Self {
            inner,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Create a manager from an existing store (for testing or sharing).
    pub fn from_store(store: Arc<dyn IdempotencyStore>) -> Self {
        Self {
            inner: store,
            key_prefix: IdempotencyConfig::default().key_prefix,
        }
    }

    /// Builds the namespaced key for a caller's token.
    pub fn key_for(&self, collection: &str, identity: &str, token: &str) -> String {
        keys::idempotency(&self.key_prefix, collection, identity, token)
    }
}

#[async_trait]
impl IdempotencyStore for IdempotencyManager {
    async fn lookup(&self, key: &str) -> AppResult<Option<Value>> {
        self.inner.lookup(key).await
    }

    async fn store(&self, key: &str, result: Value) -> AppResult<()> {
        self.inner.store(key, result).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }

    fn ttl(&self) -> Duration {
        self.inner.ttl()
    }
}
