//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("JWT secret must be at least {0} characters")]
    JwtSecretTooShort(usize),

    #[error("Token lifetime must be between 5 minutes and 30 days")]
    InvalidTokenTtl,

    #[error("Bootstrap admin password must be at least 8 characters")]
    BootstrapPasswordTooShort,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Membership fee must be positive")]
    InvalidMembershipFee,

    #[error("Membership period and renewal window must be positive, window shorter than period")]
    InvalidMembershipPeriod,

    #[error("Site URL must start with http:// or https://")]
    InvalidSiteUrl,

    #[error("Upload size limit must be between 1 byte and 100 MiB")]
    InvalidUploadLimit,

    #[error("Rate limit for '{0}' must allow at least one request per non-zero window")]
    InvalidRateLimit(&'static str),
}
