//! Feature flags configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Show detailed error messages (disable in production!)
    #[serde(default)]
    pub verbose_errors: bool,

    /// Enable request tracing
    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    /// Apply per-IP limits to login, signup and contact endpoints
    #[serde(default = "default_true")]
    pub enable_rate_limiting: bool,

    #[serde(default = "default_login_limit")]
    pub login_limit: RateLimitRule,

    #[serde(default = "default_signup_limit")]
    pub signup_limit: RateLimitRule,

    #[serde(default = "default_contact_limit")]
    pub contact_limit: RateLimitRule,
}

/// Requests allowed per fixed window
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct RateLimitRule {
    pub requests: u32,
    pub window_secs: u64,
}

impl RateLimitRule {
    pub const fn new(requests: u32, window_secs: u64) -> Self {
        Self {
            requests,
            window_secs,
        }
    }
}

impl FeatureFlags {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, rule) in [
            ("login", self.login_limit),
            ("signup", self.signup_limit),
            ("contact", self.contact_limit),
        ] {
            if rule.requests == 0 || rule.window_secs == 0 {
                return Err(ValidationError::InvalidRateLimit(name));
            }
        }
        Ok(())
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            verbose_errors: false,
            enable_tracing: true,
            enable_rate_limiting: true,
            login_limit: default_login_limit(),
            signup_limit: default_signup_limit(),
            contact_limit: default_contact_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_login_limit() -> RateLimitRule {
    RateLimitRule::new(10, 60)
}

fn default_signup_limit() -> RateLimitRule {
    RateLimitRule::new(5, 3600)
}

fn default_contact_limit() -> RateLimitRule {
    RateLimitRule::new(5, 3600)
}
