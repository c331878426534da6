//! Stripe webhook endpoint: `POST /api/webhooks/stripe`.
//!
//! No bearer auth; the `Stripe-Signature` header is verified instead.

pub mod handlers;

use axum::routing::post;
use axum::Router;

use crate::adapters::http::state::AppState;

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(handlers::stripe_webhook))
}
