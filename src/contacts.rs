//! Contact records served by the demo.

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use recordhub_hooks::HookSet;
use recordhub_service::{CrudOperations, ValidatedSchema};

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

/// Insert shape.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewContact {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub owner_id: String,
}

/// Update shape.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
}

pub type ContactOperations =
    CrudOperations<Contact, ValidatedSchema<NewContact>, ValidatedSchema<ContactPatch>>;

/// Audit hooks: one structured log line per committed mutation.
pub fn audit_hooks() -> HookSet<Contact> {
    HookSet::new()
        .after_create(|contact: Contact, ctx| async move {
            info!(
                audit = true,
                operation = %ctx.operation,
                record_id = %contact.id,
                user_id = %ctx.user_id,
                "Contact created"
            );
            Ok(())
        })
        .after_update(|contact: Contact, previous: Option<Contact>, ctx| async move {
            info!(
                audit = true,
                operation = %ctx.operation,
                record_id = %contact.id,
                previous_name = ?previous.map(|p| p.name),
                name = %contact.name,
                "Contact updated"
            );
            Ok(())
        })
        .after_delete(|contact: Contact, ctx| async move {
            info!(
                audit = true,
                operation = %ctx.operation,
                record_id = %contact.id,
                mode = ?ctx.get_string("mode"),
                "Contact deleted"
            );
            Ok(())
        })
}
