//! Per-collection operation factory configuration.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{AppError, ValidationIssue};
use crate::types::query::is_identifier;

/// Default ordering applied by `list` when the caller gives none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DefaultSort {
    /// Column to order by.
    #[validate(custom(function = "validate_identifier"))]
    pub column: String,
    /// Ascending when true.
    #[serde(default)]
    pub ascending: bool,
}

impl Default for DefaultSort {
    fn default() -> Self {
        Self {
            column: "created_at".to_string(),
            ascending: false,
        }
    }
}

/// Configuration resolved once per factory and shared by all of its
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FactoryConfig {
    /// Column holding the owner identity.
    #[validate(custom(function = "validate_identifier"))]
    pub owner_id_column: String,
    /// Whether `list` returns archived rows by default.
    pub include_archived: bool,
    /// Paths/tags handed to the revalidator. `None` derives `/<collection>`.
    pub revalidate_paths: Option<Vec<String>>,
    /// Projection: `*` or a comma-separated column list.
    #[validate(custom(function = "validate_projection"))]
    pub select_query: String,
    /// Translate the raw identity into a profile id before scoping.
    pub use_profile_lookup: bool,
    /// Enables archive/unarchive and turns delete into a soft delete.
    pub has_soft_delete: bool,
    /// Ordering used when `list` is called without a sort.
    #[validate(nested)]
    pub default_sort: DefaultSort,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            owner_id_column: "owner_id".to_string(),
            include_archived: false,
            revalidate_paths: None,
            select_query: "*".to_string(),
            use_profile_lookup: false,
            has_soft_delete: true,
            default_sort: DefaultSort::default(),
        }
    }
}

impl FactoryConfig {
    /// Validates the configuration for the given collection.
    pub fn validate_for(&self, collection: &str) -> Result<(), AppError> {
        if !is_identifier(collection) {
            return Err(AppError::validation(
                format!("Invalid collection name '{collection}'"),
                vec![ValidationIssue::new(
                    "collection",
                    "identifier",
                    "must be a plain SQL identifier",
                )],
            ));
        }
        self.validate().map_err(|errors| {
            let mut err = AppError::from(errors);
            err.message = format!("Invalid factory configuration for '{collection}'");
            err
        })
    }

    /// Returns the revalidation paths, deriving the default from the
    /// collection name when none are configured.
    pub fn resolved_revalidate_paths(&self, collection: &str) -> Vec<String> {
        self.revalidate_paths
            .clone()
            .unwrap_or_else(|| vec![format!("/{collection}")])
    }
}

fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ValidationError::new("identifier").with_message("must be a plain SQL identifier".into()))
    }
}

fn validate_projection(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed == "*" {
        return Ok(());
    }
    if !trimmed.is_empty() && trimmed.split(',').all(|c| is_identifier(c.trim())) {
        return Ok(());
    }
    Err(ValidationError::new("projection")
        .with_message("must be '*' or a comma-separated column list".into()))
}
