use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::middleware::RateLimits;
use crate::adapters::http::state::AppState;
use crate::adapters::rate_limiter::{LOGIN_RESOURCE, SIGNUP_RESOURCE};

use super::handlers::{
    cancel_rsvp, download_my_receipt, get_me, list_my_payments, list_my_rsvps, log_in, rsvp,
    sign_up, start_event_checkout, start_membership_checkout, update_me,
};

/// # Routes
///
/// - `POST /signup`, `POST /login`
/// - `GET|PATCH /me`
/// - `POST /me/membership/checkout`
/// - `GET /me/rsvps`
/// - `POST|DELETE /me/events/:id/rsvp`, `POST /me/events/:id/checkout`
/// - `GET /me/payments`, `GET /me/payments/:id/receipt`
pub fn member_routes(limits: &RateLimits) -> Router<AppState> {
    Router::new()
        .route("/signup", limits.wrap(post(sign_up), SIGNUP_RESOURCE))
        .route("/login", limits.wrap(post(log_in), LOGIN_RESOURCE))
        .route("/me", get(get_me).patch(update_me))
        .route("/me/membership/checkout", post(start_membership_checkout))
        .route("/me/rsvps", get(list_my_rsvps))
        .route("/me/events/:id/rsvp", post(rsvp).delete(cancel_rsvp))
        .route("/me/events/:id/checkout", post(start_event_checkout))
        .route("/me/payments", get(list_my_payments))
        .route("/me/payments/:id/receipt", get(download_my_receipt))
}
