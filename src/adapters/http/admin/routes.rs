use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::adapters::http::middleware::RateLimits;
use crate::adapters::http::state::AppState;
use crate::adapters::rate_limiter::LOGIN_RESOURCE;

use super::handlers::*;

/// Room for multipart boundaries and the text fields around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// # Routes
///
/// - `POST /login`
/// - `/members`, `/admin-users`, `/events`, `/gallery`, `/payments`,
///   `/referral-sources`, `/messages` resource routes
/// - `GET /stats`
pub fn admin_routes(limits: &RateLimits, max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/login", limits.wrap(post(log_in), LOGIN_RESOURCE))
        // Members
        .route("/members", get(list_members))
        .route("/members/:id", get(get_member).delete(delete_member))
        .route("/members/:id/status", patch(update_member_status))
        .route("/members/:id/notes", patch(update_member_notes))
        // Admin users
        .route("/admin-users", get(list_admin_users).post(create_admin_user))
        .route(
            "/admin-users/:id",
            patch(update_admin_user).delete(delete_admin_user),
        )
        // Events
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/publish", post(set_event_published))
        .route("/events/:id/rsvps", get(list_event_rsvps))
        .route("/events/:id/rsvps/:rsvp_id/check-in", post(check_in))
        // Gallery
        .route(
            "/gallery",
            get(list_gallery).post(upload_image).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route("/gallery/:id", patch(update_image).delete(delete_image))
        // Payments
        .route("/payments", get(list_payments))
        .route("/payments/:id", get(get_payment))
        .route("/payments/:id/refund", post(refund_payment))
        .route("/payments/:id/receipt", get(download_receipt))
        // Marketing
        .route("/stats", get(get_stats))
        .route(
            "/referral-sources",
            get(list_referral_sources).post(create_referral_source),
        )
        .route(
            "/referral-sources/:id",
            patch(update_referral_source).delete(delete_referral_source),
        )
        // Contact messages
        .route("/messages", get(list_messages))
        .route("/messages/unread-count", get(count_unread_messages))
        .route("/messages/:id", patch(mark_message_read).delete(delete_message))
}
