//! Tenant resolution.
//!
//! Every generated operation starts here: the caller's identity decides
//! which store handle serves the call and which owner id scopes it.

use std::sync::Arc;

use tracing::{debug, warn};

use recordhub_core::config::AuthConfig;
use recordhub_core::error::AppError;
use recordhub_core::result::AppResult;
use recordhub_core::traits::auth::{AuthProvider, ProfileLookup};
use recordhub_core::traits::storage::DataStore;

/// Store handles available to the resolver.
#[derive(Debug, Clone)]
pub struct StoreHandles {
    /// Handle subject to the caller's own access rules.
    pub user: Arc<dyn DataStore>,
    /// Privileged handle used for the development identity.
    pub service: Option<Arc<dyn DataStore>>,
}

impl StoreHandles {
    /// Only a user handle.
    pub fn user_only(user: Arc<dyn DataStore>) -> Self {
        Self {
            user,
            service: None,
        }
    }

    /// A user handle plus a privileged service handle.
    pub fn with_service(user: Arc<dyn DataStore>, service: Arc<dyn DataStore>) -> Self {
        Self {
            user,
            service: Some(service),
        }
    }
}

/// Outcome of a resolution: the store to use and the owner to scope by.
#[derive(Debug, Clone)]
pub struct TenantScope {
    /// Store handle serving this call.
    pub store: Arc<dyn DataStore>,
    /// Owner id every query and write is scoped to.
    pub owner_id: String,
    /// Whether the development identity was substituted.
    pub development_fallback: bool,
}

/// The raw identity behind a call, before profile indirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Identity reported by the auth provider, or the development identity.
    pub identity: String,
    /// Whether the development identity was substituted.
    pub development_fallback: bool,
}

/// Resolves the owner identity for a call.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    /// Identity source.
    auth: Arc<dyn AuthProvider>,
    /// Store handles.
    stores: StoreHandles,
    /// Development mode and profile settings.
    config: AuthConfig,
    /// Profile indirection, when configured.
    profiles: Option<Arc<dyn ProfileLookup>>,
}

impl TenantResolver {
    /// Creates a resolver without profile indirection.
    pub fn new(auth: Arc<dyn AuthProvider>, stores: StoreHandles, config: AuthConfig) -> Self {
        Self {
            auth,
            stores,
            config,
            profiles: None,
        }
    }

    /// Attaches a profile lookup.
    pub fn with_profile_lookup(mut self, profiles: Arc<dyn ProfileLookup>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Whether a profile lookup is attached.
    pub fn has_profile_lookup(&self) -> bool {
        self.profiles.is_some()
    }

    /// Resolves the store handle and owner id for the current caller.
    ///
    /// An anonymous caller fails with `NotAuthenticated` unless development
    /// mode is on, in which case the development identity is used with the
    /// service handle. With `use_profile_lookup`, the identity is replaced
    /// by its profile id; a missing profile row keeps the raw identity.
    pub async fn resolve(&self, use_profile_lookup: bool) -> AppResult<TenantScope> {
        let caller = self.identify().await?;
        self.scope(caller, use_profile_lookup).await
    }

    /// Reads the caller's raw identity without touching any store.
    pub async fn identify(&self) -> AppResult<Caller> {
        match self.auth.current_identity().await? {
            Some(identity) => Ok(Caller {
                identity,
                development_fallback: false,
            }),
            None if self.config.development_mode => {
                warn!(
                    user_id = %self.config.development_user_id,
                    "No authenticated identity, using development identity"
                );
                Ok(Caller {
                    identity: self.config.development_user_id.clone(),
                    development_fallback: true,
                })
            }
            None => Err(AppError::not_authenticated("Not authenticated")),
        }
    }

    /// Picks the store handle and owner id for an identified caller.
    pub async fn scope(&self, caller: Caller, use_profile_lookup: bool) -> AppResult<TenantScope> {
        let Caller {
            identity,
            development_fallback,
        } = caller;

        let store = if development_fallback {
            match &self.stores.service {
                Some(service) => Arc::clone(service),
                None => {
                    warn!("No service store handle configured, development calls use the user handle");
                    Arc::clone(&self.stores.user)
                }
            }
        } else {
            Arc::clone(&self.stores.user)
        };

        let owner_id = if use_profile_lookup {
            let profiles = self.profiles.as_ref().ok_or_else(|| {
                AppError::configuration("Profile lookup requested but no profile lookup is configured")
            })?;
            match profiles.profile_id(&identity).await? {
                Some(profile_id) => {
                    debug!(user_id = %identity, profile_id = %profile_id, "Resolved profile");
                    profile_id
                }
                None => {
                    warn!(
                        user_id = %identity,
                        "No profile row for identity, scoping by raw identity"
                    );
                    identity
                }
            }
        } else {
            identity
        };

        Ok(TenantScope {
            store,
            owner_id,
            development_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::StoreProfileLookup;
    use crate::provider::StaticAuthProvider;
    use recordhub_core::config::DEVELOPMENT_USER_ID;
    use recordhub_core::error::ErrorKind;
    use recordhub_database::MemoryDataStore;
    use serde_json::json;

    fn handles() -> (MemoryDataStore, MemoryDataStore, StoreHandles) {
        let user = MemoryDataStore::new();
        let service = MemoryDataStore::new();
        let stores = StoreHandles::with_service(Arc::new(user.clone()), Arc::new(service.clone()));
        (user, service, stores)
    }

    #[tokio::test]
    async fn test_authenticated_caller_uses_user_handle() {
        let (_, _, stores) = handles();
        let resolver = TenantResolver::new(
            Arc::new(StaticAuthProvider::authenticated("u-1")),
            stores,
            AuthConfig::default(),
        );
        let scope = resolver.resolve(false).await.unwrap();
        assert_eq!(scope.owner_id, "u-1");
        assert!(!scope.development_fallback);
    }

    #[tokio::test]
    async fn test_anonymous_caller_rejected() {
        let (_, _, stores) = handles();
        let resolver = TenantResolver::new(
            Arc::new(StaticAuthProvider::anonymous()),
            stores,
            AuthConfig::default(),
        );
        let err = resolver.resolve(false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_development_mode_substitutes_identity_and_service_handle() {
        let (_, service, stores) = handles();
        let config = AuthConfig {
            development_mode: true,
            ..AuthConfig::default()
        };
        let resolver =
            TenantResolver::new(Arc::new(StaticAuthProvider::anonymous()), stores, config);

        let scope = resolver.resolve(false).await.unwrap();
        assert_eq!(scope.owner_id, DEVELOPMENT_USER_ID);
        assert!(scope.development_fallback);

        scope
            .store
            .insert("notes", json!({"id": "n1"}).as_object().cloned().unwrap(), "*")
            .await
            .unwrap();
        assert_eq!(service.rows("notes").await.len(), 1);
    }

    #[tokio::test]
    async fn test_profile_indirection_and_fallback() {
        let (user, _, stores) = handles();
        user.seed(
            "profiles",
            vec![json!({"id": "p-1", "user_id": "u-1"}).as_object().cloned().unwrap()],
        )
        .await;
        let lookup = StoreProfileLookup::new(Arc::new(user.clone()), &AuthConfig::default());

        let auth = Arc::new(StaticAuthProvider::authenticated("u-1"));
        let resolver = TenantResolver::new(auth.clone(), stores, AuthConfig::default())
            .with_profile_lookup(Arc::new(lookup));
        assert!(resolver.has_profile_lookup());

        assert_eq!(resolver.resolve(true).await.unwrap().owner_id, "p-1");
        assert_eq!(resolver.resolve(false).await.unwrap().owner_id, "u-1");

        auth.set_identity(Some("u-2".to_string())).await;
        assert_eq!(resolver.resolve(true).await.unwrap().owner_id, "u-2");
    }

    #[tokio::test]
    async fn test_profile_lookup_required_but_missing() {
        let (_, _, stores) = handles();
        let resolver = TenantResolver::new(
            Arc::new(StaticAuthProvider::authenticated("u-1")),
            stores,
            AuthConfig::default(),
        );
        let err = resolver.resolve(true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_identify_reads_no_store() {
        let (user, _, stores) = handles();
        let config = AuthConfig {
            development_mode: true,
            ..AuthConfig::default()
        };
        let auth = Arc::new(StaticAuthProvider::authenticated("u-1"));
        let resolver = TenantResolver::new(auth.clone(), stores, config);

        let caller = resolver.identify().await.unwrap();
        assert_eq!(caller.identity, "u-1");
        assert!(!caller.development_fallback);

        auth.set_identity(None).await;
        let caller = resolver.identify().await.unwrap();
        assert_eq!(caller.identity, DEVELOPMENT_USER_ID);
        assert!(caller.development_fallback);
        assert_eq!(user.write_count(), 0);
    }
}
