//! CheckoutStarter - Opens a Stripe Checkout session for a pending payment.
//!
//! Shared by the membership and event ticket flows. The payment row is only
//! stored once the provider has returned a session, so a failed provider call
//! leaves nothing behind.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::member::Member;
use crate::domain::payment::Payment;
use crate::ports::{CreateCheckoutRequest, PaymentProvider, PaymentRepository};

/// Where the customer lands after Checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRedirects {
    pub success_url: String,
    pub cancel_url: String,
}

/// Pending payment plus the URL the client should redirect to.
#[derive(Debug, Clone)]
pub struct CheckoutStarted {
    pub payment: Payment,
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Clone)]
pub struct CheckoutStarter {
    payments: Arc<dyn PaymentRepository>,
    provider: Arc<dyn PaymentProvider>,
}

impl CheckoutStarter {
    pub fn new(payments: Arc<dyn PaymentRepository>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { payments, provider }
    }

    pub async fn start(
        &self,
        mut payment: Payment,
        member: &Member,
        product_name: &str,
        redirects: CheckoutRedirects,
    ) -> Result<CheckoutStarted, DomainError> {
        let mut metadata = HashMap::from([
            ("purpose".to_string(), payment.purpose.as_str().to_string()),
            ("member_id".to_string(), member.id.to_string()),
        ]);
        if let Some(event_id) = payment.event_id {
            metadata.insert("event_id".to_string(), event_id.to_string());
        }
        if payment.guests > 0 {
            metadata.insert("guests".to_string(), payment.guests.to_string());
        }

        let session = self
            .provider
            .create_checkout_session(CreateCheckoutRequest {
                payment_id: payment.id,
                customer_email: member.email.as_str().to_string(),
                customer_id: member.stripe_customer_id.clone(),
                product_name: product_name.to_string(),
                description: Some(payment.description.clone()),
                amount: payment.amount.clone(),
                success_url: redirects.success_url,
                cancel_url: redirects.cancel_url,
                metadata,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    payment_id = %payment.id,
                    member_id = %member.id,
                    error = %e,
                    "Checkout session creation failed"
                );
                DomainError::from(e)
            })?;

        payment.attach_checkout_session(&session.id);
        self.payments.save(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            member_id = %member.id,
            purpose = %payment.purpose,
            amount_cents = payment.amount.amount_cents(),
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CheckoutStarted {
            payment,
            session_id: session.id,
            checkout_url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::foundation::{ErrorCode, EventId, MemberId, Money, PaymentId};
    use crate::domain::member::NewMember;
    use crate::domain::payment::PaymentStatus;
    use crate::ports::{PaymentError, PaymentErrorCode};

    fn member() -> Member {
        Member::sign_up(
            MemberId::new(),
            NewMember::parse("ada@example.org", "Ada", "Lovelace", None, None).unwrap(),
            "hash".into(),
        )
    }

    fn redirects() -> CheckoutRedirects {
        CheckoutRedirects {
            success_url: "https://club.example.org/ok?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://club.example.org/cancel".into(),
        }
    }

    #[tokio::test]
    async fn stores_pending_payment_with_session_id() {
        let store = InMemoryStore::new();
        let provider = MockPaymentProvider::new();
        let starter = CheckoutStarter::new(Arc::new(store.clone()), Arc::new(provider.clone()));
        let member = member();
        let payment = Payment::event_ticket(
            PaymentId::new(),
            member.id,
            EventId::new(),
            Money::new(3_000, "usd").unwrap(),
            "Gala ticket",
            2,
        );

        let started = starter
            .start(payment, &member, "Gala", redirects())
            .await
            .unwrap();

        assert_eq!(started.payment.status, PaymentStatus::Pending);
        assert_eq!(
            started.payment.checkout_session_id.as_deref(),
            Some(started.session_id.as_str())
        );
        let stored = store
            .find_by_checkout_session(&started.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, started.payment.id);

        let requests = provider.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].metadata.get("guests").map(String::as_str), Some("2"));
        assert_eq!(requests[0].customer_email, "ada@example.org");
    }

    #[tokio::test]
    async fn provider_failure_stores_nothing() {
        let store = InMemoryStore::new();
        let provider = MockPaymentProvider::new();
        provider.set_error(
            "create_checkout_session",
            PaymentError::new(PaymentErrorCode::ProviderError, "stripe down"),
        );
        let starter = CheckoutStarter::new(Arc::new(store.clone()), Arc::new(provider));
        let member = member();
        let payment = Payment::membership(
            PaymentId::new(),
            member.id,
            Money::new(5_000, "usd").unwrap(),
            "Membership",
        );
        let payment_id = payment.id;

        let err = starter
            .start(payment, &member, "Membership", redirects())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentProviderError);
        assert!(PaymentRepository::find_by_id(&store, &payment_id)
            .await
            .unwrap()
            .is_none());
    }
}
