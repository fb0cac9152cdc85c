//! Idempotency key construction.
//!
//! Keys are namespaced by collection and by caller identity, so factories
//! sharing one injected store never answer each other's retries and one
//! caller's token never replays another caller's result.

/// Builds the storage key for a caller token on a collection.
pub fn idempotency(prefix: &str, collection: &str, identity: &str, token: &str) -> String {
    format!("{prefix}{collection}:{identity}:{token}")
}
