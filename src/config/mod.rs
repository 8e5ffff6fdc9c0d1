//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `PARLEY` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use parley::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ai;
mod auth;
mod database;
mod error;
mod server;

pub use ai::AiConfig;
pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_LEN};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::adapters::auth::JwtConfig;
use crate::application::ConversationSettings;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Listener, environment, and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection
    pub database: DatabaseConfig,

    /// Bearer token verification
    pub auth: AuthConfig,

    /// Completion service
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads variables with the `PARLEY` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `PARLEY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PARLEY__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PARLEY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Besides each section's own checks, a completion must be able to time
    /// out before the HTTP request that waits on it does.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.ai.validate()?;

        if self.ai.timeout_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::CompletionTimeoutTooLong {
                completion_secs: self.ai.timeout_secs,
                request_secs: self.server.request_timeout_secs,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.auth.jwt_secret.expose_secret().clone())
            .with_leeway_secs(self.auth.leeway_secs)
    }

    pub fn conversation_settings(&self) -> ConversationSettings {
        ConversationSettings {
            completion_timeout: self.ai.timeout(),
            request_timeout: self.server.request_timeout(),
        }
    }
}
