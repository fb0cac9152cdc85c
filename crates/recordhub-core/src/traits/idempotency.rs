//! Idempotency store trait.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;

/// Time-bounded key to result store used to answer retried mutations.
///
/// A stored result older than [`ttl`](Self::ttl) is never returned. A second
/// `store` under the same key overwrites the first.
#[async_trait]
pub trait IdempotencyStore: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the result stored under `key` if it is still fresh.
    async fn lookup(&self, key: &str) -> AppResult<Option<Value>>;

    /// Stores `result` under `key`.
    async fn store(&self, key: &str, result: Value) -> AppResult<()>;

    /// Removes a single key.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Removes every entry.
    async fn clear(&self) -> AppResult<()>;

    /// How long a stored result stays valid.
    fn ttl(&self) -> Duration;
}
