use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::middleware::RateLimits;
use crate::adapters::http::state::AppState;
use crate::adapters::rate_limiter::CONTACT_RESOURCE;

use super::handlers::{
    get_event, get_site_content, list_gallery, list_referral_sources, list_upcoming_events,
    submit_contact,
};

pub fn public_routes(limits: &RateLimits) -> Router<AppState> {
    Router::new()
        .route("/site", get(get_site_content))
        .route("/events", get(list_upcoming_events))
        .route("/events/:id", get(get_event))
        .route("/gallery", get(list_gallery))
        .route("/referral-sources", get(list_referral_sources))
        .route("/contact", limits.wrap(post(submit_contact), CONTACT_RESOURCE))
}
