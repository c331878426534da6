//! Rate limiting port for abuse-prone public endpoints.

use async_trait::async_trait;

use crate::domain::foundation::Timestamp;

/// Port for rate limiting operations.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if request is allowed, consuming a slot if so.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;

    /// Clears the current window for a key.
    async fn reset(&self, key: RateLimitKey) -> Result<(), RateLimitError>;
}

/// Client identifier plus the protected resource.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub identifier: String,
    pub resource: String,
}

impl RateLimitKey {
    /// Per-IP key for one resource, e.g. `("203.0.113.9", "contact")`.
    pub fn ip(ip: &str, resource: &str) -> Self {
        Self {
            identifier: ip.to_string(),
            resource: resource.to_string(),
        }
    }

    pub fn storage_key(&self) -> String {
        format!("ratelimit:{}:{}", self.resource, self.identifier)
    }
}

#[derive(Debug, Clone)]
pub enum RateLimitResult {
    Allowed(RateLimitStatus),
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: Timestamp,
    pub window_secs: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Seconds until the client should retry.
    pub retry_after_secs: u32,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
