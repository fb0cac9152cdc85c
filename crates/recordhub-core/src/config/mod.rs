//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod database;
pub mod factory;
pub mod idempotency;
pub mod logging;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use self::auth::{AuthConfig, DEVELOPMENT_USER_ID};
pub use self::database::{DatabaseConfig, PoolConfig};
pub use self::factory::{DefaultSort, FactoryConfig};
pub use self::idempotency::IdempotencyConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Idempotency cache settings.
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    /// Identity resolution settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Postgres connection settings. Absent means the in-memory store.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Per-collection factory overrides keyed by collection name.
    #[serde(default)]
    pub collections: HashMap<String, FactoryConfig>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `RECORDHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        tracing::debug!(env = %env, "Loading configuration");
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RECORDHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Returns the factory configuration for a collection, falling back to
    /// the defaults when the collection has no section of its own.
    pub fn collection(&self, name: &str) -> FactoryConfig {
        self.collections.get(name).cloned().unwrap_or_default()
    }
}
