//! Identity collaborator traits.

use async_trait::async_trait;

use crate::result::AppResult;

/// Supplies the caller's authenticated identity.
#[async_trait]
pub trait AuthProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The current identity, or `None` for an anonymous caller.
    async fn current_identity(&self) -> AppResult<Option<String>>;
}

/// Translates a raw identity into an application profile id.
///
/// Implementations must be pure lookups.
#[async_trait]
pub trait ProfileLookup: Send + Sync + std::fmt::Debug + 'static {
    /// The profile id for `user_id`, or `None` if no profile row exists.
    async fn profile_id(&self, user_id: &str) -> AppResult<Option<String>>;
}
