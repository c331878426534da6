//! Rate limiter adapters.
//!
//! - `InMemoryRateLimiter` - fixed-window counters per process

mod in_memory;

pub use in_memory::{InMemoryRateLimiter, CONTACT_RESOURCE, LOGIN_RESOURCE, SIGNUP_RESOURCE};
