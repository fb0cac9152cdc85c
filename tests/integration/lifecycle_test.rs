//! Integration tests for the record lifecycle and hook ordering.

mod helpers;

use std::sync::{Arc, Mutex};

use serde_json::json;

use recordhub_core::config::FactoryConfig;
use recordhub_core::{AppError, ErrorKind};
use recordhub_hooks::HookSet;
use recordhub_service::ListOptions;

/// Hook set recording the order in which hooks fire.
fn recording_hooks(log: &Arc<Mutex<Vec<String>>>) -> HookSet<helpers::Contact> {
    let (a, b, c, d, e, f, g) = (
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
    );
    HookSet::new()
        .before_create(move |_, _| {
            let log = a.clone();
            async move {
                log.lock().unwrap().push("before_create".into());
                Ok(())
            }
        })
        .after_create(move |_, _| {
            let log = b.clone();
            async move {
                log.lock().unwrap().push("after_create".into());
                Ok(())
            }
        })
        .before_update(move |_, _| {
            let log = c.clone();
            async move {
                log.lock().unwrap().push("before_update".into());
                Ok(())
            }
        })
        .after_update(move |_, _, _| {
            let log = d.clone();
            async move {
                log.lock().unwrap().push("after_update".into());
                Ok(())
            }
        })
        .before_delete(move |_, _| {
            let log = e.clone();
            async move {
                log.lock().unwrap().push("before_delete".into());
                Ok(())
            }
        })
        .after_delete(move |_, _| {
            let log = f.clone();
            async move {
                log.lock().unwrap().push("after_delete".into());
                Ok(())
            }
        })
        .before_read(move |_| {
            let log = g.clone();
            async move {
                log.lock().unwrap().push("before_read".into());
                Ok(())
            }
        })
}

#[tokio::test]
async fn test_full_lifecycle_fires_hooks_in_order() {
    let app = helpers::TestApp::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let contacts = app.contacts_with(FactoryConfig::default(), recording_hooks(&log));

    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();
    contacts
        .update(&jane.id, json!({"email": "jane@example.com"}), None)
        .await
        .unwrap();
    contacts.list(ListOptions::new()).await.unwrap();
    contacts.archive(&jane.id).await.unwrap();
    contacts.unarchive(&jane.id).await.unwrap();
    contacts.get_one(&jane.id).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        [
            "before_create",
            "after_create",
            "before_update",
            "after_update",
            "before_read",
            "before_delete",
            "after_delete",
        ]
    );
}

#[tokio::test]
async fn test_archive_round_trip_preserves_other_fields() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();
    let jane = contacts
        .create(json!({"name": "Jane", "email": "jane@example.com"}), None)
        .await
        .unwrap();

    contacts.archive(&jane.id).await.unwrap();
    assert!(contacts.list(ListOptions::new()).await.unwrap().is_empty());
    let archived = contacts
        .list(ListOptions::new().include_archived(true))
        .await
        .unwrap();
    assert_eq!(archived[0].status.as_deref(), Some("archived"));
    assert!(archived[0].archived_at.is_some());

    let restored = contacts.unarchive(&jane.id).await.unwrap();
    assert_eq!(restored, jane);
    assert_eq!(contacts.list(ListOptions::new()).await.unwrap(), vec![jane]);
}

#[tokio::test]
async fn test_archive_without_soft_delete_is_unsupported() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts_with(
        FactoryConfig {
            has_soft_delete: false,
            ..FactoryConfig::default()
        },
        HookSet::new(),
    );
    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();

    let err = contacts.archive(&jane.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnsupportedOperation);
    assert_eq!(contacts.get_one(&jane.id).await.unwrap(), jane);

    contacts.delete(&jane.id).await.unwrap();
    assert!(app.store.rows("contacts").await.is_empty());
}

#[tokio::test]
async fn test_invalid_update_writes_nothing() {
    let app = helpers::TestApp::new();
    let contacts = app.contacts();
    let jane = contacts.create(json!({"name": "Jane"}), None).await.unwrap();
    let writes = app.store.write_count();

    let err = contacts
        .update(&jane.id, json!({"name": ""}), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!err.issues.is_empty());
    assert_eq!(app.store.write_count(), writes);
}

#[tokio::test]
async fn test_failing_before_create_blocks_insert() {
    let app = helpers::TestApp::new();
    let hooks = HookSet::new().before_create(|payload, _| async move {
        if payload["name"] == "Blocked" {
            return Err(AppError::hook("name is on the block list"));
        }
        Ok(())
    });
    let contacts = app.contacts_with(FactoryConfig::default(), hooks);

    let err = contacts
        .create(json!({"name": "Blocked"}), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Hook);
    assert_eq!(err.message, "name is on the block list");
    assert!(app.store.rows("contacts").await.is_empty());

    contacts.create(json!({"name": "Allowed"}), None).await.unwrap();
    assert_eq!(app.store.rows("contacts").await.len(), 1);
}

#[tokio::test]
async fn test_empty_identifier_fields_become_null() {
    let app = helpers::TestApp::new();
    let notes = recordhub_service::CrudFactory::<serde_json::Value, _, _>::new(
        "notes",
        recordhub_service::PassthroughSchema,
        recordhub_service::PassthroughSchema,
    )
    .build(app.resolver())
    .unwrap();

    let note = notes
        .create(json!({"body": "hi", "contact_id": "", "parentId": ""}), None)
        .await
        .unwrap();
    assert_eq!(note["contact_id"], serde_json::Value::Null);
    assert_eq!(note["parentId"], serde_json::Value::Null);
    assert_eq!(note["body"], json!("hi"));
}
