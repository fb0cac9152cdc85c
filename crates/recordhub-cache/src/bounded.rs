//! Capacity-bounded idempotency store using the moka crate.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;

use recordhub_core::result::AppResult;
use recordhub_core::traits::idempotency::IdempotencyStore;

/// Bounded idempotency store.
///
/// moka expires entries after the TTL on its own and evicts the least
/// useful entries once `max_capacity` is reached, so a retry may miss
/// under memory pressure even within the TTL.
#[derive(Debug, Clone)]
pub struct BoundedIdempotencyStore {
    /// The underlying moka cache.
    cache: Cache<String, Value>,
    /// Result lifetime.
    ttl: Duration,
}

impl BoundedIdempotencyStore {
    /// Create a new bounded store.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }
}

#[async_trait]
impl IdempotencyStore for BoundedIdempotencyStore {
    async fn lookup(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.cache.get(key).await)
    }

    async fn store(&self, key: &str, result: Value) -> AppResult<()> {
        self.cache.insert(key.to_string(), result).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
