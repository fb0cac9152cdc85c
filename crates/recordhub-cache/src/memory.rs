//! Unbounded in-memory idempotency store using dashmap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use recordhub_core::result::AppResult;
use recordhub_core::traits::clock::{Clock, SystemClock};
use recordhub_core::traits::idempotency::IdempotencyStore;

/// A stored result and the instant it was written.
#[derive(Debug, Clone)]
struct CachedResult {
    result: Value,
    stored_at: DateTime<Utc>,
}

/// In-memory idempotency store.
///
/// Every lookup first evicts all entries older than the TTL, then answers
/// from what remains.
#[derive(Debug, Clone)]
pub struct MemoryIdempotencyStore {
    /// Key to stored result.
    entries: Arc<DashMap<String, CachedResult>>,
    /// Result lifetime.
    ttl: Duration,
    /// Time source for `stored_at` and expiry.
    clock: Arc<dyn Clock>,
}

impl MemoryIdempotencyStore {
    /// Create a store using the wall clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            clock,
        }
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired idempotency entries");
        }
        removed
    }

    fn is_expired(&self, entry: &CachedResult, now: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(entry.stored_at) > ttl
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn lookup(&self, key: &str) -> AppResult<Option<Value>> {
        self.purge_expired();
        let now = self.clock.now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| !self.is_expired(entry.value(), now))
            .map(|entry| entry.value().result.clone()))
    }

    async fn store(&self, key: &str, result: Value) -> AppResult<()> {
        self.entries.insert(
            key.to_string(),
            CachedResult {
                result,
                stored_at: self.clock.now(),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
