//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use recordhub_auth::{StaticAuthProvider, StoreHandles, StoreProfileLookup, TenantResolver};
use recordhub_cache::IdempotencyManager;
use recordhub_cache::memory::MemoryIdempotencyStore;
use recordhub_core::config::{AuthConfig, FactoryConfig};
use recordhub_core::traits::clock::ManualClock;
use recordhub_database::MemoryDataStore;
use recordhub_hooks::HookSet;
use recordhub_service::{CrudFactory, CrudOperations, ValidatedSchema};

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub archived_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewContact {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub owner_id: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
}

pub type Contacts =
    CrudOperations<Contact, ValidatedSchema<NewContact>, ValidatedSchema<ContactPatch>>;

/// Test application context
pub struct TestApp {
    /// Store handle subject to the caller's access rules
    pub store: MemoryDataStore,
    /// Privileged store handle used in development mode
    pub service_store: MemoryDataStore,
    /// Caller identity, switchable mid-test
    pub auth: Arc<StaticAuthProvider>,
    /// Shared time source
    pub clock: Arc<ManualClock>,
    /// Idempotency store shared by every operation set built here
    pub idempotency: Arc<MemoryIdempotencyStore>,
    /// Identity settings
    pub auth_config: AuthConfig,
}

impl TestApp {
    /// Create a new test application with an authenticated caller
    pub fn new() -> Self {
        let start = DateTime::from_timestamp(1_760_000_000, 0).expect("valid timestamp");
        let clock = Arc::new(ManualClock::new(start));
        Self {
            store: MemoryDataStore::with_clock(clock.clone()),
            service_store: MemoryDataStore::with_clock(clock.clone()),
            auth: Arc::new(StaticAuthProvider::authenticated("user-a")),
            idempotency: Arc::new(MemoryIdempotencyStore::with_clock(
                Duration::from_secs(300),
                clock.clone(),
            )),
            clock,
            auth_config: AuthConfig::default(),
        }
    }

    /// Create a test application in development mode with no caller
    pub fn development() -> Self {
        let mut app = Self::new();
        app.auth = Arc::new(StaticAuthProvider::anonymous());
        app.auth_config.development_mode = true;
        app
    }

    /// Switch the caller identity
    pub async fn login(&self, user_id: &str) {
        self.auth.set_identity(Some(user_id.to_string())).await;
    }

    /// Clear the caller identity
    pub async fn logout(&self) {
        self.auth.set_identity(None).await;
    }

    /// Build a resolver over both store handles with profile lookup attached
    pub fn resolver(&self) -> TenantResolver {
        let profiles = StoreProfileLookup::new(Arc::new(self.store.clone()), &self.auth_config);
        TenantResolver::new(
            self.auth.clone(),
            StoreHandles::with_service(
                Arc::new(self.store.clone()),
                Arc::new(self.service_store.clone()),
            ),
            self.auth_config.clone(),
        )
        .with_profile_lookup(Arc::new(profiles))
    }

    /// Build the contacts operation set
    pub fn contacts_with(&self, config: FactoryConfig, hooks: HookSet<Contact>) -> Contacts {
        CrudFactory::new("contacts", ValidatedSchema::new(), ValidatedSchema::new())
            .config(config)
            .hooks(hooks)
            .idempotency(IdempotencyManager::from_store(self.idempotency.clone()))
            .clock(self.clock.clone())
            .build(self.resolver())
            .expect("Failed to build contacts")
    }

    /// Build the contacts operation set with default configuration
    pub fn contacts(&self) -> Contacts {
        self.contacts_with(FactoryConfig::default(), HookSet::new())
    }
}
