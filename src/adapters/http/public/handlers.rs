//! HTTP handlers for public endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::adapters::http::dto::{EventResponse, GalleryImageResponse, ReferralSourceResponse};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::application::handlers::content::SubmitContactCommand;
use crate::domain::content::SiteContent;
use crate::domain::foundation::EventId;

use super::dto::{ContactRequest, ContactResponse};

/// GET /api/site
pub async fn get_site_content(State(state): State<AppState>) -> Json<SiteContent> {
    let content = state.site_content_handler().handle();
    Json(SiteContent::clone(&content))
}

/// GET /api/events
pub async fn list_upcoming_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = state.upcoming_events_handler().handle().await?;
    Ok(Json(events.iter().map(EventResponse::from).collect()))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.published_event_handler().handle(event_id).await?;
    Ok(Json(EventResponse::from(&event)))
}

/// GET /api/gallery
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryImageResponse>>, ApiError> {
    let images = state.list_images_handler().handle().await?;
    Ok(Json(images.iter().map(GalleryImageResponse::from).collect()))
}

/// GET /api/referral-sources
pub async fn list_referral_sources(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReferralSourceResponse>>, ApiError> {
    let sources = state.list_referral_sources_handler().handle(true).await?;
    Ok(Json(sources.iter().map(ReferralSourceResponse::from).collect()))
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .submit_contact_handler()
        .handle(SubmitContactCommand {
            name: request.name,
            email: request.email,
            subject: request.subject,
            message: request.message,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            id: message.id,
            received: true,
        }),
    ))
}
