//! Mock payment provider.
//!
//! Backs `PaymentMode::Mock` for local demos and the integration tests.
//! Supports:
//! - Call tracking
//! - Error injection
//! - Real webhook signature checks with a configurable secret, so tests
//!   exercise the same path as production

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateRefundRequest, PaymentError, PaymentProvider,
    Refund, WebhookEvent,
};

use super::webhook_types::parse_event;

/// Secret used when none is configured.
pub const MOCK_WEBHOOK_SECRET: &str = "whsec_mock";

/// Mock payment provider.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_error("create_refund", PaymentError::network("timeout"));
/// let header = mock.sign_webhook(&payload);
/// ```
#[derive(Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
    verifier: StripeWebhookVerifier,
}

#[derive(Default)]
struct MockState {
    checkouts: Vec<CreateCheckoutRequest>,
    refunds: Vec<CreateRefundRequest>,
    /// Refunds already issued, by idempotency key.
    issued_refunds: HashMap<String, Refund>,
    method_errors: HashMap<String, PaymentError>,
    call_log: Vec<MethodCall>,
    sequence: u64,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::with_webhook_secret(MOCK_WEBHOOK_SECRET)
    }

    pub fn with_webhook_secret(secret: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState::default())),
            verifier: StripeWebhookVerifier::new(secret),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail the next call to `method` with `error`.
    pub fn set_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkouts.clone()
    }

    pub fn refund_requests(&self) -> Vec<CreateRefundRequest> {
        self.state().refunds.clone()
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Builds a `Stripe-Signature` header valid right now.
    pub fn sign_webhook(&self, payload: &[u8]) -> String {
        self.verifier.sign(payload, chrono::Utc::now().timestamp())
    }

    fn record(state: &mut MockState, method: &str, args: Vec<String>) -> Result<(), PaymentError> {
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.method_errors.remove(method) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.state();
        Self::record(
            &mut state,
            "create_checkout_session",
            vec![
                request.payment_id.to_string(),
                request.amount.amount_cents().to_string(),
            ],
        )?;

        state.sequence += 1;
        let id = format!("cs_mock_{}", state.sequence);
        let url = request.success_url.replace("{CHECKOUT_SESSION_ID}", &id);
        state.checkouts.push(request);

        Ok(CheckoutSession {
            id,
            url,
            expires_at: Some(chrono::Utc::now().timestamp() + 24 * 60 * 60),
        })
    }

    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, PaymentError> {
        let mut state = self.state();
        Self::record(
            &mut state,
            "create_refund",
            vec![
                request.payment_intent_id.clone(),
                request.amount_cents.to_string(),
            ],
        )?;

        if let Some(existing) = state.issued_refunds.get(&request.idempotency_key) {
            return Ok(existing.clone());
        }

        state.sequence += 1;
        let refund = Refund {
            id: format!("re_mock_{}", state.sequence),
            amount_cents: request.amount_cents,
            status: "succeeded".to_string(),
        };
        state
            .issued_refunds
            .insert(request.idempotency_key.clone(), refund.clone());
        state.refunds.push(request);
        Ok(refund)
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        {
            let mut state = self.state();
            Self::record(&mut state, "verify_webhook", vec![signature.to_string()])?;
        }
        self.verifier
            .verify(payload, signature)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;
        parse_event(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, PaymentId};
    use crate::ports::{PaymentErrorCode, WebhookEventKind};

    fn checkout() -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            payment_id: PaymentId::new(),
            customer_email: "m@example.org".into(),
            customer_id: None,
            product_name: "Membership".into(),
            description: None,
            amount: Money::new(5000, "usd").unwrap(),
            success_url: "http://localhost/ok?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "http://localhost/cancel".into(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn checkout_url_embeds_session_id() {
        let mock = MockPaymentProvider::new();
        let session = mock.create_checkout_session(checkout()).await.unwrap();
        assert_eq!(session.url, format!("http://localhost/ok?session_id={}", session.id));
        assert_eq!(mock.checkout_requests().len(), 1);
        assert!(mock.was_called("create_checkout_session"));
    }

    #[tokio::test]
    async fn injected_error_fires_once() {
        let mock = MockPaymentProvider::new();
        mock.set_error("create_checkout_session", PaymentError::network("down"));

        let err = mock.create_checkout_session(checkout()).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(mock.create_checkout_session(checkout()).await.is_ok());
    }

    #[tokio::test]
    async fn refunds_are_idempotent_per_key() {
        let mock = MockPaymentProvider::new();
        let request = CreateRefundRequest {
            payment_intent_id: "pi_1".into(),
            amount_cents: 1000,
            reason: None,
            idempotency_key: "refund-a-0".into(),
            metadata: HashMap::new(),
        };
        let first = mock.create_refund(request.clone()).await.unwrap();
        let second = mock.create_refund(request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(mock.refund_requests().len(), 1);
    }

    #[tokio::test]
    async fn webhooks_must_be_signed() {
        let mock = MockPaymentProvider::new();
        let payload = serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.expired",
            "created": 1,
            "data": { "object": { "id": "cs_mock_1" } }
        })
        .to_string();

        let header = mock.sign_webhook(payload.as_bytes());
        let event = mock.verify_webhook(payload.as_bytes(), &header).await.unwrap();
        assert!(matches!(event.kind, WebhookEventKind::CheckoutExpired { .. }));

        let err = mock
            .verify_webhook(payload.as_bytes(), "t=1,v1=00")
            .await
            .unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }
}
