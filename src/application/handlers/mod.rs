//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped by
//! area. Each handler takes its ports as `Arc<dyn Port>` and exposes a single
//! `handle` method.

pub mod admin_users;
pub mod content;
pub mod events;
pub mod gallery;
pub mod marketing;
pub mod members;
pub mod payments;

#[cfg(test)]
mod test_support;
