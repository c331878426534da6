//! HTTP handlers for member endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::adapters::http::dto::{
    CheckoutResponse, EventResponse, MemberResponse, PaymentResponse, ReceiptDownload,
    RsvpResponse,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireMember;
use crate::adapters::http::state::AppState;
use crate::application::handlers::events::{
    CancelRsvpCommand, RsvpCommand, StartEventCheckoutCommand,
};
use crate::application::handlers::members::{
    LogInMemberCommand, SignUpCommand, UpdateProfileCommand,
};
use crate::application::handlers::payments::{ReceiptRequester, RenderReceiptQuery};
use crate::domain::foundation::{EventId, PaymentId};

use super::dto::{
    LogInRequest, ReservationResponse, SeatsRequest, SessionResponse, SignUpRequest,
    SignUpResponse, UpdateProfileRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Account
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/members/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .sign_up_handler()
        .handle(SignUpCommand {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            referral_source_id: request.referral_source_id,
        })
        .await?;

    let response = SignUpResponse {
        member: MemberResponse::from(&result.member),
        token: result.token.into(),
        checkout: result.checkout.map(CheckoutResponse::from),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/members/login
pub async fn log_in(
    State(state): State<AppState>,
    Json(request): Json<LogInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let result = state
        .member_log_in_handler()
        .handle(LogInMemberCommand {
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(SessionResponse {
        member: MemberResponse::from(&result.member),
        token: result.token.into(),
    }))
}

/// GET /api/members/me
pub async fn get_me(
    State(state): State<AppState>,
    member: RequireMember,
) -> Result<Json<MemberResponse>, ApiError> {
    let profile = state.profile_handler().handle(member.member_id).await?;
    Ok(Json(MemberResponse::from(&profile)))
}

/// PATCH /api/members/me
pub async fn update_me(
    State(state): State<AppState>,
    member: RequireMember,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let updated = state
        .update_profile_handler()
        .handle(UpdateProfileCommand {
            member_id: member.member_id,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            password: request.password,
        })
        .await?;
    Ok(Json(MemberResponse::from(&updated)))
}

/// POST /api/members/me/membership/checkout
pub async fn start_membership_checkout(
    State(state): State<AppState>,
    member: RequireMember,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let started = state
        .membership_checkout_handler()
        .handle(member.member_id)
        .await?;
    Ok(Json(started.into()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/members/me/rsvps
pub async fn list_my_rsvps(
    State(state): State<AppState>,
    member: RequireMember,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let rsvps = state.member_rsvps_handler().handle(member.member_id).await?;
    Ok(Json(
        rsvps
            .iter()
            .map(|r| ReservationResponse {
                rsvp: RsvpResponse::from(&r.rsvp),
                event: EventResponse::from(&r.event),
            })
            .collect(),
    ))
}

/// POST /api/members/me/events/:id/rsvp
pub async fn rsvp(
    State(state): State<AppState>,
    member: RequireMember,
    Path(event_id): Path<EventId>,
    Json(request): Json<SeatsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .rsvp_handler()
        .handle(RsvpCommand {
            event_id,
            member_id: member.member_id,
            guests: request.guests,
        })
        .await?;

    let response = ReservationResponse {
        rsvp: RsvpResponse::from(&result.rsvp),
        event: EventResponse::from(&result.event),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/members/me/events/:id/rsvp
pub async fn cancel_rsvp(
    State(state): State<AppState>,
    member: RequireMember,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state
        .cancel_rsvp_handler()
        .handle(CancelRsvpCommand {
            event_id,
            member_id: member.member_id,
        })
        .await?;
    Ok(Json(EventResponse::from(&event)))
}

/// POST /api/members/me/events/:id/checkout
pub async fn start_event_checkout(
    State(state): State<AppState>,
    member: RequireMember,
    Path(event_id): Path<EventId>,
    Json(request): Json<SeatsRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let started = state
        .event_checkout_handler()
        .handle(StartEventCheckoutCommand {
            event_id,
            member_id: member.member_id,
            guests: request.guests,
        })
        .await?;
    Ok(Json(started.into()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/members/me/payments
pub async fn list_my_payments(
    State(state): State<AppState>,
    member: RequireMember,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state
        .member_payments_handler()
        .handle(member.member_id)
        .await?;
    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

/// GET /api/members/me/payments/:id/receipt
pub async fn download_my_receipt(
    State(state): State<AppState>,
    member: RequireMember,
    Path(payment_id): Path<PaymentId>,
) -> Result<ReceiptDownload, ApiError> {
    let receipt = state
        .receipt_handler()
        .handle(RenderReceiptQuery {
            payment_id,
            requester: ReceiptRequester::Member(member.member_id),
        })
        .await?;
    Ok(ReceiptDownload(receipt))
}
