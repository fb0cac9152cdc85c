//! Identity resolution configuration.

use serde::{Deserialize, Serialize};

/// Sentinel identity used when development mode substitutes a caller.
pub const DEVELOPMENT_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Identity resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When set, an anonymous caller is replaced by the development identity
    /// and served through the service store handle.
    #[serde(default)]
    pub development_mode: bool,
    /// Identity substituted in development mode.
    #[serde(default = "default_development_user_id")]
    pub development_user_id: String,
    /// Collection holding profile rows for profile indirection.
    #[serde(default = "default_profile_collection")]
    pub profile_collection: String,
    /// Column of the profile collection holding the raw identity.
    #[serde(default = "default_profile_user_column")]
    pub profile_user_column: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            development_mode: false,
            development_user_id: default_development_user_id(),
            profile_collection: default_profile_collection(),
            profile_user_column: default_profile_user_column(),
        }
    }
}

fn default_development_user_id() -> String {
    DEVELOPMENT_USER_ID.to_string()
}

fn default_profile_collection() -> String {
    "profiles".to_string()
}

fn default_profile_user_column() -> String {
    "user_id".to_string()
}
