//! Auth provider with a settable identity.

use async_trait::async_trait;
use tokio::sync::RwLock;

use recordhub_core::result::AppResult;
use recordhub_core::traits::auth::AuthProvider;

/// Auth provider returning whatever identity it currently holds.
///
/// Hosts that authenticate upstream (e.g. a gateway that forwards a
/// verified user id) wrap that id in one of these per request.
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    identity: RwLock<Option<String>>,
}

impl StaticAuthProvider {
    /// Creates a provider for an authenticated caller.
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            identity: RwLock::new(Some(user_id.into())),
        }
    }

    /// Creates a provider for an anonymous caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replaces the current identity.
    pub async fn set_identity(&self, identity: Option<String>) {
        *self.identity.write().await = identity;
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_identity(&self) -> AppResult<Option<String>> {
        Ok(self.identity.read().await.clone())
    }
}
