//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API:
//! one-off Checkout sessions, refunds, and webhook verification.
//!
//! # Security
//!
//! - Signatures are checked by [`StripeWebhookVerifier`] (HMAC-SHA256,
//!   constant-time comparison, 5-minute replay window)
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateRefundRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, Refund, WebhookEvent,
};

use super::webhook_types::{api_error, parse_event, StripeCheckoutSession, StripeRefund};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(&config.stripe_api_key, &config.stripe_webhook_secret)
            .with_base_url(&config.stripe_api_base_url)
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.expose_secret());
        Self {
            config,
            verifier,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Form fields for a single-line-item Checkout session in payment mode.
    fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
        let payment_id = request.payment_id.to_string();
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            (
                "line_items[0][price_data][currency]".into(),
                request.amount.currency().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                request.amount.amount_cents().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                request.product_name.clone(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("client_reference_id".into(), payment_id.clone()),
            ("metadata[payment_id]".into(), payment_id.clone()),
            ("payment_intent_data[metadata][payment_id]".into(), payment_id),
        ];

        if let Some(description) = &request.description {
            params.push((
                "line_items[0][price_data][product_data][description]".into(),
                description.clone(),
            ));
        }

        match &request.customer_id {
            Some(customer) => params.push(("customer".into(), customer.clone())),
            None => params.push(("customer_email".into(), request.customer_email.clone())),
        }

        let mut extra: Vec<_> = request.metadata.iter().collect();
        extra.sort();
        for (key, value) in extra {
            if key == "payment_id" {
                continue;
            }
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }

    fn refund_params(request: &CreateRefundRequest) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("payment_intent".into(), request.payment_intent_id.clone()),
            ("amount".into(), request.amount_cents.to_string()),
        ];
        if let Some(reason) = request.reason {
            params.push(("reason".into(), reason.as_str().to_string()));
        }
        let mut extra: Vec<_> = request.metadata.iter().collect();
        extra.sort();
        for (key, value) in extra {
            params.push((format!("metadata[{}]", key), value.clone()));
        }
        params
    }

    async fn read_error(operation: &str, response: reqwest::Response) -> PaymentError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let error = api_error(status, &body);
        tracing::error!(
            operation,
            status,
            code = %error.code,
            provider_code = error.provider_code.as_deref().unwrap_or(""),
            "Stripe request failed"
        );
        error
    }
}

fn parse_failure(e: reqwest::Error) -> PaymentError {
    PaymentError::new(
        PaymentErrorCode::ProviderError,
        format!("Failed to parse Stripe response: {}", e),
    )
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = Self::checkout_params(&request);

        let response = self
            .http_client
            .post(self.url("/v1/checkout/sessions"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error("create_checkout_session", response).await);
        }

        let session: StripeCheckoutSession = response.json().await.map_err(parse_failure)?;
        let url = session.url.ok_or_else(|| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                "Stripe returned a checkout session without a URL",
            )
        })?;

        tracing::info!(
            session_id = %session.id,
            payment_id = %request.payment_id,
            amount_cents = request.amount.amount_cents(),
            "Checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url,
            expires_at: session.expires_at,
        })
    }

    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, PaymentError> {
        let params = Self::refund_params(&request);

        let response = self
            .http_client
            .post(self.url("/v1/refunds"))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error("create_refund", response).await);
        }

        let refund: StripeRefund = response.json().await.map_err(parse_failure)?;

        tracing::info!(
            refund_id = %refund.id,
            payment_intent = %request.payment_intent_id,
            amount_cents = refund.amount,
            "Refund created"
        );

        Ok(Refund {
            id: refund.id,
            amount_cents: refund.amount,
            status: refund.status.unwrap_or_else(|| "pending".to_string()),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        self.verifier.verify(payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Webhook signature rejected");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        let event = parse_event(payload)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, PaymentId};
    use crate::ports::RefundReason;
    use std::collections::HashMap;

    const SECRET: &str = "whsec_test_secret";

    fn adapter() -> StripePaymentAdapter {
        StripePaymentAdapter::new(StripeConfig::new("sk_test_123", SECRET))
    }

    fn checkout_request() -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            payment_id: PaymentId::new(),
            customer_email: "member@example.org".into(),
            customer_id: None,
            product_name: "Annual membership".into(),
            description: Some("Twelve months of club access".into()),
            amount: Money::new(5000, "usd").unwrap(),
            success_url: "http://localhost:3000/membership/success".into(),
            cancel_url: "http://localhost:3000/membership".into(),
            metadata: HashMap::from([("purpose".to_string(), "membership".to_string())]),
        }
    }

    fn value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn checkout_params_use_inline_price_data() {
        let request = checkout_request();
        let params = StripePaymentAdapter::checkout_params(&request);
        let payment_id = request.payment_id.to_string();

        assert_eq!(value(&params, "mode"), Some("payment"));
        assert_eq!(value(&params, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(value(&params, "line_items[0][price_data][unit_amount]"), Some("5000"));
        assert_eq!(value(&params, "metadata[payment_id]"), Some(payment_id.as_str()));
        assert_eq!(value(&params, "client_reference_id"), Some(payment_id.as_str()));
        assert_eq!(value(&params, "metadata[purpose]"), Some("membership"));
        assert_eq!(value(&params, "customer_email"), Some("member@example.org"));
        assert_eq!(value(&params, "customer"), None);
    }

    #[test]
    fn checkout_params_prefer_existing_customer() {
        let mut request = checkout_request();
        request.customer_id = Some("cus_42".into());
        let params = StripePaymentAdapter::checkout_params(&request);
        assert_eq!(value(&params, "customer"), Some("cus_42"));
        assert_eq!(value(&params, "customer_email"), None);
    }

    #[test]
    fn refund_params_carry_amount_and_reason() {
        let request = CreateRefundRequest {
            payment_intent_id: "pi_1".into(),
            amount_cents: 1500,
            reason: Some(RefundReason::RequestedByCustomer),
            idempotency_key: "refund-x-0".into(),
            metadata: HashMap::new(),
        };
        let params = StripePaymentAdapter::refund_params(&request);
        assert_eq!(value(&params, "payment_intent"), Some("pi_1"));
        assert_eq!(value(&params, "amount"), Some("1500"));
        assert_eq!(value(&params, "reason"), Some("requested_by_customer"));
    }

    #[tokio::test]
    async fn verify_webhook_accepts_signed_payload() {
        let payload = br#"{"id":"evt_1","type":"customer.created","created":1,"data":{"object":{}}}"#;
        let header =
            StripeWebhookVerifier::new(SECRET).sign(payload, chrono::Utc::now().timestamp());

        let event = adapter().verify_webhook(payload, &header).await.unwrap();
        assert_eq!(event.id, "evt_1");
    }

    #[tokio::test]
    async fn verify_webhook_rejects_wrong_secret() {
        let payload = br#"{"id":"evt_1","type":"customer.created","created":1,"data":{"object":{}}}"#;
        let header = StripeWebhookVerifier::new("whsec_other")
            .sign(payload, chrono::Utc::now().timestamp());

        let err = adapter().verify_webhook(payload, &header).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new("sk_test_123", SECRET).with_base_url("http://127.0.0.1:9"),
        );
        let err = adapter
            .create_checkout_session(checkout_request())
            .await
            .unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(err.retryable);
    }
}
