//! Member endpoints under `/api/members`.
//!
//! Signup and login are public (and rate limited); everything under `/me`
//! requires a member bearer token.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::member_routes;
