//! Operation context handed to lifecycle hooks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// A record is being inserted.
    Create,
    /// Records are being read.
    Read,
    /// A record is being modified.
    Update,
    /// A record is being deleted or archived.
    Delete,
}

impl OperationKind {
    /// Returns the string name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who did what, to which record, and when.
///
/// Built fresh for every invocation and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationContext {
    /// The operation being performed.
    pub operation: OperationKind,
    /// Collection name.
    pub entity_type: String,
    /// Record id; absent for list.
    pub entity_id: Option<String>,
    /// Resolved owner identity of the caller.
    pub user_id: String,
    /// When the operation started.
    pub timestamp: DateTime<Utc>,
    /// Open key-value bag.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl OperationContext {
    /// Starts building a context.
    pub fn builder(
        operation: OperationKind,
        entity_type: impl Into<String>,
    ) -> OperationContextBuilder {
        OperationContextBuilder {
            operation,
            entity_type: entity_type.into(),
            entity_id: None,
            user_id: String::new(),
            timestamp: None,
            metadata: HashMap::new(),
        }
    }

    /// Gets a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Gets a string metadata value.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Builder for [`OperationContext`].
#[derive(Debug, Clone)]
pub struct OperationContextBuilder {
    operation: OperationKind,
    entity_type: String,
    entity_id: Option<String>,
    user_id: String,
    timestamp: Option<DateTime<Utc>>,
    metadata: HashMap<String, serde_json::Value>,
}

impl OperationContextBuilder {
    /// Sets the record id.
    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Sets the resolved owner identity.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the operation start time. Defaults to now.
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Inserts a metadata value.
    pub fn metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Inserts a string metadata value.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.metadata(key, serde_json::json!(value))
    }

    /// Finishes the context.
    pub fn build(self) -> OperationContext {
        OperationContext {
            operation: self.operation,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            user_id: self.user_id,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            metadata: self.metadata,
        }
    }
}
