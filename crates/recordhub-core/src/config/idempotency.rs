//! Idempotency cache configuration.

use serde::{Deserialize, Serialize};

/// Idempotency cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyConfig {
    /// Store type: `"memory"` (unbounded, lazily purged) or `"bounded"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// How long a stored result answers retries, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of entries for the bounded store.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Prefix for all idempotency keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    10000
}

fn default_key_prefix() -> String {
    "idem:".to_string()
}
