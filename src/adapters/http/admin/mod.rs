//! Back-office endpoints under `/api/admin`.
//!
//! Login is public and rate limited. Everything else requires an admin
//! bearer token; viewers can read, editors manage content and members,
//! administrators also delete members, refund payments and manage staff.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::admin_routes;
