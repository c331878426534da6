//! HTTP adapter: axum routers, DTOs, middleware and error mapping.
//!
//! - `/api/...` public pages (site, events, gallery, referral sources, contact)
//! - `/api/members/...` signup, login and the member's own account
//! - `/api/admin/...` back office
//! - `/api/webhooks/stripe` Stripe events
//! - `/health` liveness probe

pub mod admin;
pub mod dto;
pub mod error;
pub mod members;
pub mod middleware;
pub mod public;
pub mod router;
pub mod state;
pub mod webhooks;

pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, HttpOptions};
pub use state::{AppState, Repositories};
