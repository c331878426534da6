//! HTTP middleware for axum.
//!
//! - `auth` - bearer token validation and principal extractors
//! - `rate_limit` - per-IP limits on sensitive public endpoints

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthState, RequireAdmin, RequireMember};
pub use rate_limit::{rate_limit_middleware, RateLimitState, RateLimits};
