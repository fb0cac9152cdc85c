//! Integration tests for idempotent retries.

mod helpers;

use chrono::Duration;
use serde_json::json;

use recordhub_core::config::FactoryConfig;
use recordhub_hooks::HookSet;
use recordhub_service::ListOptions;

#[tokio::test]
async fn test_retried_create_returns_first_result() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();

    let first = contacts
        .create(json!({"name": "Jane"}), Some("key-1"))
        .await
        .unwrap();
    assert!(!first.id.is_empty());
    assert_eq!(first.owner_id, "user-a");
    assert_eq!(first.status.as_deref(), Some("active"));
    assert_eq!(first.archived_at, None);

    app.clock.advance(Duration::minutes(4));
    let retry = contacts
        .create(json!({"name": "Jane"}), Some("key-1"))
        .await
        .unwrap();

    assert_eq!(retry, first);
    assert_eq!(app.store.write_count(), 1);
}

#[tokio::test]
async fn test_retry_after_ttl_executes_again() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();

    contacts
        .create(json!({"name": "Jane"}), Some("key-1"))
        .await
        .unwrap();
    app.clock.advance(Duration::minutes(5) + Duration::seconds(1));
    contacts
        .create(json!({"name": "Jane"}), Some("key-1"))
        .await
        .unwrap();

    assert_eq!(app.store.write_count(), 2);
    let listed = contacts.list(ListOptions::new()).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_keys_do_not_collide_across_collections() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();
    let leads = recordhub_service::CrudFactory::new(
        "leads",
        recordhub_service::ValidatedSchema::<helpers::NewContact>::new(),
        recordhub_service::ValidatedSchema::<helpers::ContactPatch>::new(),
    )
    .config(FactoryConfig::default())
    .hooks(HookSet::<helpers::Contact>::new())
    .idempotency(recordhub_cache::IdempotencyManager::from_store(
        app.idempotency.clone(),
    ))
    .clock(app.clock.clone())
    .build(app.resolver())
    .unwrap();

    let contact = contacts
        .create(json!({"name": "Jane"}), Some("shared"))
        .await
        .unwrap();
    let lead = leads
        .create(json!({"name": "Jane"}), Some("shared"))
        .await
        .unwrap();

    assert_ne!(contact.id, lead.id);
    assert_eq!(app.store.rows("leads").await.len(), 1);
}

#[tokio::test]
async fn test_clearing_the_store_forgets_results() {
    use recordhub_core::traits::idempotency::IdempotencyStore;

    let app = helpers::TestApp::new();
    let contacts = app.contacts();

    contacts
        .create(json!({"name": "Jane"}), Some("key-1"))
        .await
        .unwrap();
    app.idempotency.clear().await.unwrap();
    contacts
        .create(json!({"name": "Jane"}), Some("key-1"))
        .await
        .unwrap();

    assert_eq!(app.store.write_count(), 2);
}

#[tokio::test]
async fn test_failed_update_is_not_remembered() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();
    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();

    let err = contacts
        .update(&jane.id, json!({"name": ""}), Some("rename"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, recordhub_core::ErrorKind::Validation);

    let renamed = contacts
        .update(&jane.id, json!({"name": "Janet"}), Some("rename"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Janet");
}

#[tokio::test]
async fn test_token_replays_only_for_its_own_caller() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();

    let secret = contacts
        .create(json!({"name": "Secret A"}), Some("key-1"))
        .await
        .unwrap();

    app.login("user-b").await;
    let bob = contacts
        .create(json!({"name": "Bob"}), Some("key-1"))
        .await
        .unwrap();
    assert_ne!(bob.id, secret.id);
    assert_eq!(bob.owner_id, "user-b");
    assert_eq!(bob.name, "Bob");

    app.logout().await;
    let err = contacts
        .create(json!({"name": "Anon"}), Some("key-1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, recordhub_core::ErrorKind::Authentication);

    app.login("user-a").await;
    let replay = contacts
        .create(json!({"name": "Other"}), Some("key-1"))
        .await
        .unwrap();
    assert_eq!(replay, secret);
    assert_eq!(app.store.write_count(), 2);
}
