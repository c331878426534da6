//! Payment provider port for external payment processing.
//!
//! Covers what the club needs from Stripe: one-off Checkout sessions,
//! refunds against a payment intent, and verified webhook events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, Money, PaymentId};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a Checkout session in `payment` mode for one line item.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Refund part or all of a captured payment intent.
    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, PaymentError>;

    /// Verify a webhook signature and parse the event.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Stored as `metadata[payment_id]` and `client_reference_id`.
    pub payment_id: PaymentId,
    pub customer_email: String,
    pub customer_id: Option<String>,
    pub product_name: String,
    pub description: Option<String>,
    pub amount: Money,
    pub success_url: String,
    pub cancel_url: String,
    /// Extra metadata copied onto the session.
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
    /// Unix timestamp.
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefundRequest {
    pub payment_intent_id: String,
    pub amount_cents: i64,
    pub reason: Option<RefundReason>,
    /// Sent as the `Idempotency-Key` header.
    pub idempotency_key: String,
    pub metadata: HashMap<String, String>,
}

/// Reasons Stripe accepts on a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    Duplicate,
    Fraudulent,
    RequestedByCustomer,
}

impl RefundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundReason::Duplicate => "duplicate",
            RefundReason::Fraudulent => "fraudulent",
            RefundReason::RequestedByCustomer => "requested_by_customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount_cents: i64,
    pub status: String,
}

/// Webhook event from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: String,
    /// Raw provider type, e.g. `checkout.session.completed`.
    pub event_type: String,
    pub kind: WebhookEventKind,
    /// Unix timestamp.
    pub created_at: i64,
}

/// The event types this service acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    CheckoutCompleted {
        session_id: String,
        payment_id: Option<String>,
        payment_intent_id: Option<String>,
        /// `paid`, `unpaid` or `no_payment_required`.
        payment_status: String,
        amount_total: Option<i64>,
    },
    CheckoutExpired {
        session_id: String,
        payment_id: Option<String>,
    },
    /// A delayed payment method (bank debit) was declined.
    CheckoutFailed {
        session_id: String,
        payment_id: Option<String>,
    },
    ChargeRefunded {
        payment_intent_id: String,
        amount_refunded: i64,
    },
    /// Acknowledged and ignored.
    Other,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Provider's error code (if available).
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::InvalidWebhook => ErrorCode::InvalidWebhookSignature,
            _ => ErrorCode::PaymentProviderError,
        };
        let mut domain = DomainError::new(code, err.message);
        if let Some(provider_code) = err.provider_code {
            domain = domain.with_detail("provider_code", provider_code);
        }
        domain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    NotFound,
    RateLimited,
    InvalidWebhook,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimited
                | PaymentErrorCode::ProviderError
        )
    }
}

impl fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimited => "rate_limited",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        f.write_str(s)
    }
}
