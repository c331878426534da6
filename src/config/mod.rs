//! Typed configuration read from `CLUBHOUSE__*` environment variables.
//!
//! Sections nest with a double underscore, e.g. `CLUBHOUSE__DATABASE__POOL__MAX_CONNECTIONS`.
//! A `.env` file is honored in development. Only `AUTH__JWT_SECRET` is
//! required; everything else has a default suited to local runs.
//!
//! ```no_run
//! use clubhouse::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod content;
mod database;
mod error;
mod features;
mod payment;
mod receipt;
mod server;
mod storage;

pub use auth::AuthConfig;
pub use content::ContentConfig;
pub use database::{DatabaseConfig, PersistenceBackend, PoolConfig};
pub use error::{ConfigError, ValidationError};
pub use features::{FeatureFlags, RateLimitRule};
pub use payment::{PaymentConfig, PaymentMode};
pub use receipt::{ReceiptConfig, ReceiptRendererKind};
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root configuration, one field per `CLUBHOUSE__<SECTION>__` prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address, environment, CORS and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistence (PostgreSQL or in-memory)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bearer token signing and bootstrap administrator
    pub auth: AuthConfig,

    /// Stripe and membership terms
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Gallery blob storage
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub receipt: ReceiptConfig,

    #[serde(default)]
    pub content: ContentConfig,

    /// Rate limits and debugging switches
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    ///
    /// - `CLUBHOUSE__SERVER__PORT=8080` -> `server.port`
    /// - `CLUBHOUSE__PAYMENT__MODE=mock` -> `payment.mode`
    /// - `CLUBHOUSE__FEATURES__LOGIN_LIMIT__REQUESTS=20`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLUBHOUSE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// First failing section wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.storage.validate()?;
        self.receipt.validate()?;
        self.features.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
