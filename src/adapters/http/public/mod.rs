//! Public endpoints, no authentication:
//! - `GET /api/site` - site content
//! - `GET /api/events`, `GET /api/events/:id` - published upcoming events
//! - `GET /api/gallery` - gallery images
//! - `GET /api/referral-sources` - active sources for the signup form
//! - `POST /api/contact` - contact form (rate limited)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::public_routes;
