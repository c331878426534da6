//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers change state; query handlers only read.

pub mod handlers;
mod settings;

pub use settings::ClubSettings;
