//! Stripe-specific types for API responses and webhook payloads.
//!
//! These mirror the subset of Stripe's JSON the club relies on and map it
//! onto the provider-neutral [`WebhookEvent`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::{PaymentError, PaymentErrorCode, WebhookEvent, WebhookEventKind};

// ════════════════════════════════════════════════════════════════════════════════
// Event envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event as received from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe objects
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted payment page; absent once the session is complete.
    pub url: Option<String>,

    pub client_reference_id: Option<String>,

    pub customer: Option<String>,

    pub payment_intent: Option<String>,

    /// `paid`, `unpaid` or `no_payment_required`.
    #[serde(default)]
    pub payment_status: String,

    pub amount_total: Option<i64>,

    pub expires_at: Option<i64>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeCheckoutSession {
    /// Our payment id, from metadata or the client reference.
    pub fn payment_id(&self) -> Option<String> {
        self.metadata
            .get("payment_id")
            .cloned()
            .or_else(|| self.client_reference_id.clone())
    }
}

/// Stripe Charge object (for `charge.refunded`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCharge {
    pub id: String,
    pub payment_intent: Option<String>,
    /// Cumulative refunded amount in cents.
    #[serde(default)]
    pub amount_refunded: i64,
}

/// Stripe Refund object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeRefund {
    pub id: String,
    pub amount: i64,
    pub status: Option<String>,
}

/// Error body returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Mapping
// ════════════════════════════════════════════════════════════════════════════════

fn object<T: serde::de::DeserializeOwned>(
    event: &StripeWebhookEvent,
    what: &str,
) -> Result<T, PaymentError> {
    serde_json::from_value(event.data.object.clone())
        .map_err(|e| PaymentError::invalid_webhook(format!("Invalid {}: {}", what, e)))
}

/// Parse a verified webhook payload into the provider-neutral event.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook payload");
        PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
    })?;

    let kind = match event.event_type.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            let session: StripeCheckoutSession = object(&event, "checkout session")?;
            WebhookEventKind::CheckoutCompleted {
                payment_id: session.payment_id(),
                session_id: session.id,
                payment_intent_id: session.payment_intent,
                payment_status: session.payment_status,
                amount_total: session.amount_total,
            }
        }
        "checkout.session.expired" => {
            let session: StripeCheckoutSession = object(&event, "checkout session")?;
            WebhookEventKind::CheckoutExpired {
                payment_id: session.payment_id(),
                session_id: session.id,
            }
        }
        "checkout.session.async_payment_failed" => {
            let session: StripeCheckoutSession = object(&event, "checkout session")?;
            WebhookEventKind::CheckoutFailed {
                payment_id: session.payment_id(),
                session_id: session.id,
            }
        }
        "charge.refunded" => {
            let charge: StripeCharge = object(&event, "charge")?;
            match charge.payment_intent {
                Some(payment_intent_id) => WebhookEventKind::ChargeRefunded {
                    payment_intent_id,
                    amount_refunded: charge.amount_refunded,
                },
                None => WebhookEventKind::Other,
            }
        }
        _ => WebhookEventKind::Other,
    };

    Ok(WebhookEvent {
        id: event.id,
        event_type: event.event_type,
        kind,
        created_at: event.created,
    })
}

/// Map an unsuccessful Stripe response onto a `PaymentError`.
pub fn api_error(status: u16, body: &str) -> PaymentError {
    let code = match status {
        401 | 403 => PaymentErrorCode::AuthenticationError,
        404 => PaymentErrorCode::NotFound,
        429 => PaymentErrorCode::RateLimited,
        400..=499 => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| format!("Stripe API error ({})", status));
            let error = PaymentError::new(code, message);
            match parsed.error.code.or(parsed.error.error_type) {
                Some(provider_code) => error.with_provider_code(provider_code),
                None => error,
            }
        }
        Err(_) => PaymentError::new(code, format!("Stripe API error ({})", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(event_type: &str, object: serde_json::Value) -> Vec<u8> {
        serde_json::json!({
            "id": "evt_123",
            "type": event_type,
            "created": 1_704_067_200,
            "livemode": false,
            "data": { "object": object }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn parses_checkout_completed() {
        let payload = envelope(
            "checkout.session.completed",
            serde_json::json!({
                "id": "cs_test_1",
                "object": "checkout.session",
                "payment_intent": "pi_1",
                "payment_status": "paid",
                "amount_total": 5000,
                "metadata": { "payment_id": "7b0d6c1e-0000-4000-8000-000000000001" }
            }),
        );

        let event = parse_event(&payload).unwrap();
        assert_eq!(event.id, "evt_123");
        assert_eq!(
            event.kind,
            WebhookEventKind::CheckoutCompleted {
                session_id: "cs_test_1".into(),
                payment_id: Some("7b0d6c1e-0000-4000-8000-000000000001".into()),
                payment_intent_id: Some("pi_1".into()),
                payment_status: "paid".into(),
                amount_total: Some(5000),
            }
        );
    }

    #[test]
    fn payment_id_falls_back_to_client_reference() {
        let payload = envelope(
            "checkout.session.expired",
            serde_json::json!({ "id": "cs_2", "client_reference_id": "abc" }),
        );
        let event = parse_event(&payload).unwrap();
        assert_eq!(
            event.kind,
            WebhookEventKind::CheckoutExpired {
                session_id: "cs_2".into(),
                payment_id: Some("abc".into()),
            }
        );
    }

    #[test]
    fn async_payment_failure_is_not_an_expiry() {
        let payload = envelope(
            "checkout.session.async_payment_failed",
            serde_json::json!({ "id": "cs_3" }),
        );
        assert_eq!(
            parse_event(&payload).unwrap().kind,
            WebhookEventKind::CheckoutFailed {
                session_id: "cs_3".into(),
                payment_id: None,
            }
        );
    }

    #[test]
    fn parses_charge_refunded() {
        let payload = envelope(
            "charge.refunded",
            serde_json::json!({ "id": "ch_1", "payment_intent": "pi_9", "amount_refunded": 1200 }),
        );
        let event = parse_event(&payload).unwrap();
        assert_eq!(
            event.kind,
            WebhookEventKind::ChargeRefunded {
                payment_intent_id: "pi_9".into(),
                amount_refunded: 1200,
            }
        );
    }

    #[test]
    fn unknown_events_are_other() {
        let payload = envelope("customer.created", serde_json::json!({ "id": "cus_1" }));
        assert_eq!(parse_event(&payload).unwrap().kind, WebhookEventKind::Other);
    }

    #[test]
    fn invalid_json_is_invalid_webhook() {
        let err = parse_event(b"not json").unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }

    #[test]
    fn api_errors_keep_stripe_code() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"charge_already_refunded","message":"Charge has already been refunded."}}"#;
        let err = api_error(400, body);
        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("charge_already_refunded"));
        assert_eq!(err.message, "Charge has already been refunded.");

        assert_eq!(api_error(503, "").code, PaymentErrorCode::ProviderError);
        assert!(api_error(429, "").retryable);
    }
}
