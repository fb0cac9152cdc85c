//! Integration tests for owner scoping and identity resolution.

mod helpers;

use serde_json::json;

use recordhub_core::ErrorKind;
use recordhub_core::config::{DEVELOPMENT_USER_ID, FactoryConfig};
use recordhub_hooks::HookSet;
use recordhub_service::ListOptions;

#[tokio::test]
async fn test_tenants_only_see_their_own_records() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();

    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();
    app.login("user-b").await;
    contacts.create(json!({"name": "Bob"}), None).await.unwrap();

    let listed = contacts.list(ListOptions::new()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Bob");

    for err in [
        contacts.get_one(&jane.id).await.unwrap_err(),
        contacts
            .update(&jane.id, json!({"name": "Hijacked"}), None)
            .await
            .unwrap_err(),
        contacts.delete(&jane.id).await.unwrap_err(),
        contacts.unarchive(&jane.id).await.unwrap_err(),
    ] {
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!err.to_string().contains("Jane"));
    }

    app.login("user-a").await;
    assert_eq!(contacts.get_one(&jane.id).await.unwrap(), jane);
}

#[tokio::test]
async fn test_missing_and_foreign_ids_look_the_same() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();
    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();

    app.login("user-b").await;
    let foreign = contacts.get_one(&jane.id).await.unwrap_err();
    let missing = contacts.get_one("no-such-id").await.unwrap_err();
    assert_eq!(foreign.kind, missing.kind);
}

#[tokio::test]
async fn test_anonymous_caller_is_rejected() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();
    app.logout().await;

    let err = contacts
        .create(json!({"name": "Jane"}), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(app.store.rows("contacts").await.is_empty());
}

#[tokio::test]
async fn test_development_mode_uses_sentinel_identity_and_service_store() {
    let app = helpers::TestApp::development();
    let contacts = app.contacts();

    let created = contacts.create(json!({"name": "Local"}), None).await.unwrap();
    assert_eq!(created.owner_id, DEVELOPMENT_USER_ID);
    assert_eq!(app.service_store.rows("contacts").await.len(), 1);
    assert!(app.store.rows("contacts").await.is_empty());
}

#[tokio::test]
async fn test_profile_lookup_scopes_by_profile_id() {
    let app = helpers::TestApp::new();
    app.store
        .seed(
            "profiles",
            vec![
                json!({"id": "profile-a", "user_id": "user-a"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ],
        )
        .await;
    let contacts = app.contacts_with(
        FactoryConfig {
            use_profile_lookup: true,
            ..FactoryConfig::default()
        },
        HookSet::new(),
    );

    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();
    assert_eq!(jane.owner_id, "profile-a");

    // No profile row: the raw identity is used.
    app.login("user-b").await;
    let bob = contacts.create(json!({"name": "Bob"}), None).await.unwrap();
    assert_eq!(bob.owner_id, "user-b");
    assert_eq!(contacts.list(ListOptions::new()).await.unwrap(), vec![bob]);
}

#[tokio::test]
async fn test_custom_owner_column() {
    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Task {
        id: String,
        tenant_id: String,
        title: String,
    }

    let app = helpers::TestApp::new();
    let tasks = recordhub_service::CrudFactory::<Task, _, _>::new(
        "tasks",
        recordhub_service::PassthroughSchema,
        recordhub_service::PassthroughSchema,
    )
    .config(FactoryConfig {
        owner_id_column: "tenant_id".to_string(),
        ..FactoryConfig::default()
    })
    .build(app.resolver())
    .unwrap();

    let task = tasks.create(json!({"title": "ship"}), None).await.unwrap();
    assert_eq!(task.tenant_id, "user-a");
    assert_eq!(app.store.rows("tasks").await[0].get("owner_id"), None);
}
