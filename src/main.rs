//! RecordHub demo: builds a contacts operation set from configuration and
//! runs a short create, update, archive and unarchive session against it.

mod contacts;

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt};

use recordhub_auth::{StaticAuthProvider, StoreHandles, StoreProfileLookup, TenantResolver};
use recordhub_cache::IdempotencyManager;
use recordhub_core::config::AppConfig;
use recordhub_core::error::AppError;
use recordhub_core::traits::storage::DataStore;
use recordhub_database::{MemoryDataStore, PgDataStore};
use recordhub_service::{BroadcastRevalidator, CrudFactory, ListOptions, ValidatedSchema};

use crate::contacts::{ContactOperations, audit_hooks};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("RECORDHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Store handles for the configured backend.
async fn open_stores(config: &AppConfig) -> Result<StoreHandles, AppError> {
    match &config.database {
        Some(database) => {
            let store: Arc<dyn DataStore> = Arc::new(PgDataStore::connect(database).await?);
            Ok(StoreHandles::with_service(Arc::clone(&store), store))
        }
        None => {
            tracing::info!("No database configured, using the in-memory store");
            let store = MemoryDataStore::new();
            Ok(StoreHandles::with_service(
                Arc::new(store.clone()),
                Arc::new(store),
            ))
        }
    }
}

/// Main demo run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RecordHub demo v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage ──────────────────────────────────────────
    let stores = open_stores(&config).await?;

    // ── Step 2: Identity ─────────────────────────────────────────
    let auth = match std::env::var("RECORDHUB_USER") {
        Ok(user) => StaticAuthProvider::authenticated(user),
        Err(_) => StaticAuthProvider::anonymous(),
    };
    let profiles = StoreProfileLookup::new(Arc::clone(&stores.user), &config.auth);
    let resolver = TenantResolver::new(Arc::new(auth), stores, config.auth.clone())
        .with_profile_lookup(Arc::new(profiles));

    // ── Step 3: Idempotency + revalidation ───────────────────────
    let idempotency = IdempotencyManager::new(&config.idempotency)?;
    let revalidator = BroadcastRevalidator::new(64);
    let mut revalidated = revalidator.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(paths) = revalidated.recv().await {
            tracing::info!(paths = ?paths, "Revalidated");
        }
    });

    // ── Step 4: Operation set ────────────────────────────────────
    let contacts: ContactOperations =
        CrudFactory::new("contacts", ValidatedSchema::new(), ValidatedSchema::new())
            .config(config.collection("contacts"))
            .hooks(audit_hooks())
            .idempotency(idempotency)
            .revalidator(Arc::new(revalidator))
            .build(resolver)?;

    // ── Step 5: Session ──────────────────────────────────────────
    let jane = contacts
        .create(json!({"name": "Jane", "email": "jane@example.com"}), Some("demo-1"))
        .await?;
    let replay = contacts
        .create(json!({"name": "Jane", "email": "jane@example.com"}), Some("demo-1"))
        .await?;
    tracing::info!(same_record = (jane.id == replay.id), "Replayed create");

    contacts
        .update(&jane.id, json!({"name": "Jane Doe"}), None)
        .await?;
    contacts.archive(&jane.id).await?;
    let active = contacts.list(ListOptions::new()).await?;
    tracing::info!(active = active.len(), "Listed after archive");

    let restored = contacts.unarchive(&jane.id).await?;
    tracing::info!(record_id = %restored.id, status = ?restored.status, "Restored");

    drop(contacts);
    let _ = listener.await;
    tracing::info!("Demo complete");
    Ok(())
}
