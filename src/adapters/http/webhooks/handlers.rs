use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::application::handlers::payments::{
    HandleStripeWebhookCommand, HandleStripeWebhookResult,
};

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: &'static str,
}

fn outcome(result: &HandleStripeWebhookResult) -> &'static str {
    match result {
        HandleStripeWebhookResult::MembershipActivated { .. } => "membership_activated",
        HandleStripeWebhookResult::TicketConfirmed { .. } => "ticket_confirmed",
        HandleStripeWebhookResult::CheckoutExpired { .. } => "checkout_expired",
        HandleStripeWebhookResult::CheckoutFailed { .. } => "checkout_failed",
        HandleStripeWebhookResult::RefundRecorded { .. } => "refund_recorded",
        HandleStripeWebhookResult::Acknowledged => "acknowledged",
        HandleStripeWebhookResult::Ignored => "ignored",
    }
}

/// POST /api/webhooks/stripe
///
/// The body is taken as raw bytes; the signature covers the exact payload.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("signature", "Missing Stripe-Signature header"))?
        .to_string();

    let result = state
        .stripe_webhook_handler()
        .handle(HandleStripeWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    let outcome = outcome(&result);
    tracing::info!(outcome, "Stripe webhook processed");
    Ok(Json(WebhookAck {
        received: true,
        outcome,
    }))
}
