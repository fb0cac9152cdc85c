//! Hook point definitions and handler signatures.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use recordhub_core::result::AppResult;

use crate::context::OperationContext;

/// Enumeration of the hook slots an operation set exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Before insert; receives the validated payload. Can abort.
    BeforeCreate,
    /// After insert; receives the stored record.
    AfterCreate,
    /// Before update; receives the validated patch. Can abort.
    BeforeUpdate,
    /// After update; receives the new and the previous record.
    AfterUpdate,
    /// Before delete or archive; receives the record id. Can abort.
    BeforeDelete,
    /// After delete or archive; receives the pre-delete record.
    AfterDelete,
    /// Before list. Can abort.
    BeforeRead,
}

impl HookPoint {
    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeCreate => "before_create",
            Self::AfterCreate => "after_create",
            Self::BeforeUpdate => "before_update",
            Self::AfterUpdate => "after_update",
            Self::BeforeDelete => "before_delete",
            Self::AfterDelete => "after_delete",
            Self::BeforeRead => "before_read",
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Future returned by every hook.
pub type HookFuture = BoxFuture<'static, AppResult<()>>;

/// Hook receiving a JSON payload (`before_create`, `before_update`).
pub type PayloadHook = Arc<dyn Fn(Value, OperationContext) -> HookFuture + Send + Sync>;

/// Hook receiving a record id (`before_delete`).
pub type IdHook = Arc<dyn Fn(String, OperationContext) -> HookFuture + Send + Sync>;

/// Hook receiving only the context (`before_read`).
pub type ContextHook = Arc<dyn Fn(OperationContext) -> HookFuture + Send + Sync>;

/// Hook receiving a stored record (`after_create`, `after_delete`).
pub type RecordHook<T> = Arc<dyn Fn(T, OperationContext) -> HookFuture + Send + Sync>;

/// Hook receiving the new record and the previous one, if fetched.
pub type UpdateHook<T> = Arc<dyn Fn(T, Option<T>, OperationContext) -> HookFuture + Send + Sync>;
