//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. The result is treated as immutable for the lifetime of
//! the process and handed to components by reference.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay) and `OTA__` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Binary storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Token signing settings.
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// `path` is the base file (extension optional). An overlay named
    /// `config/{env}` is merged on top when present, then environment
    /// variables prefixed with `OTA__`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("OTA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_signing_key.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_signing_key must be set"));
        }
        if self.auth.jwt_issuer.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_issuer must be set"));
        }
        if self.storage.root_path.trim().is_empty() {
            return Err(AppError::configuration("storage.root_path must be set"));
        }
        if self.storage.orphan_grace_seconds > storage::MAX_ORPHAN_GRACE_SECONDS {
            return Err(AppError::configuration(format!(
                "storage.orphan_grace_seconds must not exceed {}",
                storage::MAX_ORPHAN_GRACE_SECONDS
            )));
        }
        Ok(())
    }
}
