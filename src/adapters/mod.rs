//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - Argon2 password hashing and JWT bearer tokens
//! - `content` - YAML site content
//! - `http` - axum routers and middleware
//! - `memory` - in-memory repositories for tests and demos
//! - `postgres` - PostgreSQL repositories
//! - `rate_limiter` - fixed-window limiter
//! - `receipt` - PDF receipt renderers
//! - `storage` - gallery blob storage
//! - `stripe` - Stripe Checkout, refunds and webhooks

pub mod auth;
pub mod content;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod receipt;
pub mod storage;
pub mod stripe;
