//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `SIGNAL_SHIELD` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use signal_shield::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod database;
mod error;
mod intake;
mod persistence;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;
pub use persistence::PersistenceConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL report store
    pub database: DatabaseConfig,

    /// Session store sizing and idle eviction
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Report commit retries
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then every `SIGNAL_SHIELD__*` variable:
    ///
    /// - `SIGNAL_SHIELD__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SIGNAL_SHIELD__DATABASE__URL=...` -> `database.url = ...`
    /// - `SIGNAL_SHIELD__PERSISTENCE__MAX_ATTEMPTS=5` -> `persistence.max_attempts = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SIGNAL_SHIELD")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.intake.validate()?;
        self.persistence.validate()?;

        // A commit must finish inside the request so the caller gets a reply.
        let commit = self.persistence.worst_case();
        let request = self.server.request_timeout();
        if commit >= request {
            return Err(ValidationError::CommitOutlastsRequest { commit, request });
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
