//! HandleStripeWebhookHandler - Applies verified Stripe events to payments.
//!
//! Every event is idempotent against the stored payment status: a replayed
//! `checkout.session.completed` finds the payment already succeeded and does
//! nothing, a `charge.refunded` reporting a total we already recorded is a
//! no-op.

use std::sync::Arc;

use crate::domain::event::Rsvp;
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, PaymentId, RsvpId, Timestamp,
};
use crate::domain::payment::{Payment, PaymentPurpose};
use crate::ports::{
    EventRepository, MemberRepository, PaymentProvider, PaymentRepository, WebhookEventKind,
};

use super::RefundEffects;

/// Checkout payment statuses that mean the money is in.
const SETTLED_PAYMENT_STATUSES: [&str; 2] = ["paid", "no_payment_required"];

#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandleStripeWebhookResult {
    MembershipActivated {
        payment_id: PaymentId,
        member_id: MemberId,
    },
    /// `rsvp_id` is `None` when the seat could not be reserved after payment.
    TicketConfirmed {
        payment_id: PaymentId,
        rsvp_id: Option<RsvpId>,
    },
    CheckoutExpired {
        payment_id: PaymentId,
    },
    CheckoutFailed {
        payment_id: PaymentId,
    },
    RefundRecorded {
        payment_id: PaymentId,
        fully_refunded: bool,
    },
    /// Verified but nothing to change (duplicate, unknown payment, unpaid).
    Acknowledged,
    /// Event type we do not handle.
    Ignored,
}

pub struct HandleStripeWebhookHandler {
    provider: Arc<dyn PaymentProvider>,
    payments: Arc<dyn PaymentRepository>,
    members: Arc<dyn MemberRepository>,
    events: Arc<dyn EventRepository>,
    refund_effects: RefundEffects,
    membership_period_days: i64,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        payments: Arc<dyn PaymentRepository>,
        members: Arc<dyn MemberRepository>,
        events: Arc<dyn EventRepository>,
        membership_period_days: i64,
    ) -> Self {
        let refund_effects = RefundEffects::new(members.clone(), events.clone());
        Self {
            provider,
            payments,
            members,
            events,
            refund_effects,
            membership_period_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<HandleStripeWebhookResult, DomainError> {
        let event = self
            .provider
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected Stripe webhook");
                DomainError::from(e)
            })?;

        tracing::info!(event_id = %event.id, event_type = %event.event_type, "Stripe webhook received");

        match event.kind {
            WebhookEventKind::CheckoutCompleted {
                session_id,
                payment_id,
                payment_intent_id,
                payment_status,
                ..
            } => {
                if !SETTLED_PAYMENT_STATUSES.contains(&payment_status.as_str()) {
                    tracing::info!(
                        session_id = %session_id,
                        payment_status = %payment_status,
                        "Checkout completed without settled payment"
                    );
                    return Ok(HandleStripeWebhookResult::Acknowledged);
                }
                let Some(payment) = self.locate(&session_id, payment_id.as_deref()).await? else {
                    return Ok(HandleStripeWebhookResult::Acknowledged);
                };
                self.complete_checkout(payment, payment_intent_id).await
            }
            WebhookEventKind::CheckoutExpired {
                session_id,
                payment_id,
            } => {
                let Some(mut payment) = self.locate(&session_id, payment_id.as_deref()).await? else {
                    return Ok(HandleStripeWebhookResult::Acknowledged);
                };
                if !payment.mark_expired() {
                    return Ok(HandleStripeWebhookResult::Acknowledged);
                }
                self.payments.update(&payment).await?;
                tracing::info!(payment_id = %payment.id, "Checkout expired");
                Ok(HandleStripeWebhookResult::CheckoutExpired {
                    payment_id: payment.id,
                })
            }
            WebhookEventKind::CheckoutFailed {
                session_id,
                payment_id,
            } => {
                let Some(mut payment) = self.locate(&session_id, payment_id.as_deref()).await? else {
                    return Ok(HandleStripeWebhookResult::Acknowledged);
                };
                if !payment.mark_failed() {
                    return Ok(HandleStripeWebhookResult::Acknowledged);
                }
                self.payments.update(&payment).await?;
                tracing::warn!(payment_id = %payment.id, "Delayed payment failed");
                Ok(HandleStripeWebhookResult::CheckoutFailed {
                    payment_id: payment.id,
                })
            }
            WebhookEventKind::ChargeRefunded {
                payment_intent_id,
                amount_refunded,
            } => self.record_refund(&payment_intent_id, amount_refunded).await,
            WebhookEventKind::Other => {
                tracing::debug!(event_type = %event.event_type, "Ignoring Stripe event");
                Ok(HandleStripeWebhookResult::Ignored)
            }
        }
    }

    async fn locate(
        &self,
        session_id: &str,
        payment_id: Option<&str>,
    ) -> Result<Option<Payment>, DomainError> {
        if let Some(payment) = self.payments.find_by_checkout_session(session_id).await? {
            return Ok(Some(payment));
        }
        let fallback = payment_id.and_then(|raw| raw.parse::<PaymentId>().ok());
        let payment = match fallback {
            Some(id) => self.payments.find_by_id(&id).await?,
            None => None,
        };
        if payment.is_none() {
            tracing::warn!(session_id = %session_id, "Webhook for unknown checkout session");
        }
        Ok(payment)
    }

    async fn complete_checkout(
        &self,
        mut payment: Payment,
        payment_intent_id: Option<String>,
    ) -> Result<HandleStripeWebhookResult, DomainError> {
        let now = Timestamp::now();
        match payment.mark_succeeded(payment_intent_id, now) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(payment_id = %payment.id, "Checkout already processed");
                return Ok(HandleStripeWebhookResult::Acknowledged);
            }
            Err(e) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    error = %e,
                    "Checkout completed for a payment that can no longer succeed"
                );
                return Ok(HandleStripeWebhookResult::Acknowledged);
            }
        }
        self.payments.update(&payment).await?;

        let Some(member_id) = payment.member_id else {
            return Ok(HandleStripeWebhookResult::Acknowledged);
        };

        match payment.purpose {
            PaymentPurpose::Membership => {
                let mut member = self.members.find_by_id(&member_id).await?.ok_or_else(|| {
                    DomainError::new(ErrorCode::MemberNotFound, "Member not found")
                        .with_detail("member_id", member_id.to_string())
                })?;
                member.activate_membership(now, self.membership_period_days)?;
                self.members.update(&member).await?;
                tracing::info!(
                    payment_id = %payment.id,
                    member_id = %member.id,
                    "Membership activated"
                );
                Ok(HandleStripeWebhookResult::MembershipActivated {
                    payment_id: payment.id,
                    member_id,
                })
            }
            PaymentPurpose::EventTicket => {
                let event_id = payment.event_id.ok_or_else(|| {
                    DomainError::internal("Ticket payment has no event")
                        .with_detail("payment_id", payment.id.to_string())
                })?;
                let rsvp = Rsvp::confirm(
                    RsvpId::new(),
                    event_id,
                    member_id,
                    payment.guests,
                    Some(payment.id),
                )?;
                match self.events.reserve(&rsvp).await {
                    Ok(event) => {
                        tracing::info!(
                            payment_id = %payment.id,
                            rsvp_id = %rsvp.id,
                            rsvp_count = event.rsvp_count,
                            "Ticket confirmed"
                        );
                        Ok(HandleStripeWebhookResult::TicketConfirmed {
                            payment_id: payment.id,
                            rsvp_id: Some(rsvp.id),
                        })
                    }
                    Err(e) if matches!(e.code, ErrorCode::EventFull | ErrorCode::AlreadyRsvped) => {
                        // Paid but unseatable: the payment stays succeeded for a manual refund.
                        tracing::error!(
                            payment_id = %payment.id,
                            event_id = %event_id,
                            code = %e.code,
                            "Paid ticket could not be reserved"
                        );
                        Ok(HandleStripeWebhookResult::TicketConfirmed {
                            payment_id: payment.id,
                            rsvp_id: None,
                        })
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    async fn record_refund(
        &self,
        payment_intent_id: &str,
        amount_refunded: i64,
    ) -> Result<HandleStripeWebhookResult, DomainError> {
        let Some(mut payment) = self.payments.find_by_payment_intent(payment_intent_id).await?
        else {
            tracing::warn!(payment_intent_id = %payment_intent_id, "Refund for unknown payment");
            return Ok(HandleStripeWebhookResult::Acknowledged);
        };

        let applied = match payment.sync_refunded_total(amount_refunded) {
            Ok(Some(applied)) => applied,
            Ok(None) => return Ok(HandleStripeWebhookResult::Acknowledged),
            Err(e) => {
                tracing::warn!(payment_id = %payment.id, error = %e, "Refund does not apply");
                return Ok(HandleStripeWebhookResult::Acknowledged);
            }
        };
        self.payments.update(&payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            refunded_now_cents = applied.refunded_now_cents,
            total_refunded_cents = applied.total_refunded_cents,
            "Refund recorded from Stripe"
        );

        if applied.fully_refunded {
            self.refund_effects.apply(&payment).await?;
        }
        Ok(HandleStripeWebhookResult::RefundRecorded {
            payment_id: payment.id,
            fully_refunded: applied.fully_refunded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::event::{Event, EventDetails, PricingTiers};
    use crate::domain::foundation::{EventId, Money};
    use crate::domain::member::{Member, MembershipStatus, NewMember};
    use crate::domain::payment::PaymentStatus;
    use serde_json::json;

    struct Fixture {
        store: InMemoryStore,
        provider: MockPaymentProvider,
        handler: HandleStripeWebhookHandler,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let provider = MockPaymentProvider::new();
        let handler = HandleStripeWebhookHandler::new(
            Arc::new(provider.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            365,
        );
        Fixture {
            store,
            provider,
            handler,
        }
    }

    impl Fixture {
        fn command(&self, event_type: &str, object: serde_json::Value) -> HandleStripeWebhookCommand {
            let payload = json!({
                "id": "evt_test",
                "type": event_type,
                "created": 1_700_000_000,
                "data": { "object": object },
            })
            .to_string()
            .into_bytes();
            let signature = self.provider.sign_webhook(&payload);
            HandleStripeWebhookCommand { payload, signature }
        }

        async fn member(&self) -> Member {
            let member = Member::sign_up(
                MemberId::new(),
                NewMember::parse("ada@example.org", "Ada", "Lovelace", None, None).unwrap(),
                "hash".into(),
            );
            MemberRepository::save(&self.store, &member).await.unwrap();
            member
        }

        async fn pending(&self, payment: Payment, session: &str) -> Payment {
            let mut payment = payment;
            payment.attach_checkout_session(session);
            PaymentRepository::save(&self.store, &payment).await.unwrap();
            payment
        }

        async fn event(&self, capacity: Option<u32>) -> Event {
            let now = Timestamp::now();
            let mut event = Event::create(
                EventId::new(),
                EventDetails::parse(
                    "Gala",
                    None,
                    None,
                    now.add_days(10),
                    now.add_days(11),
                    PricingTiers::new(2_000, 1_000, "usd").unwrap(),
                    capacity,
                    None,
                )
                .unwrap(),
            );
            event.set_published(true);
            EventRepository::save(&self.store, &event).await.unwrap();
            event
        }
    }

    fn completed(session: &str) -> serde_json::Value {
        json!({
            "id": session,
            "payment_intent": "pi_123",
            "payment_status": "paid",
            "amount_total": 5000,
        })
    }

    #[tokio::test]
    async fn membership_checkout_activates_member_once() {
        let f = fixture();
        let member = f.member().await;
        let payment = f
            .pending(
                Payment::membership(PaymentId::new(), member.id, Money::new(5_000, "usd").unwrap(), "Membership"),
                "cs_1",
            )
            .await;

        let result = f
            .handler
            .handle(f.command("checkout.session.completed", completed("cs_1")))
            .await
            .unwrap();
        assert_eq!(
            result,
            HandleStripeWebhookResult::MembershipActivated {
                payment_id: payment.id,
                member_id: member.id
            }
        );

        let stored = PaymentRepository::find_by_id(&f.store, &payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Succeeded);
        assert_eq!(stored.payment_intent_id.as_deref(), Some("pi_123"));
        let member = MemberRepository::find_by_id(&f.store, &member.id).await.unwrap().unwrap();
        assert_eq!(member.status, MembershipStatus::Active);
        let expires = member.membership_expires_at;

        let replay = f
            .handler
            .handle(f.command("checkout.session.completed", completed("cs_1")))
            .await
            .unwrap();
        assert_eq!(replay, HandleStripeWebhookResult::Acknowledged);
        let member = MemberRepository::find_by_id(&f.store, &member.id).await.unwrap().unwrap();
        assert_eq!(member.membership_expires_at, expires);
    }

    #[tokio::test]
    async fn ticket_checkout_reserves_seats() {
        let f = fixture();
        let member = f.member().await;
        let event = f.event(Some(10)).await;
        let payment = f
            .pending(
                Payment::event_ticket(
                    PaymentId::new(),
                    member.id,
                    event.id,
                    Money::new(4_000, "usd").unwrap(),
                    "Gala ticket",
                    2,
                ),
                "cs_2",
            )
            .await;

        let result = f
            .handler
            .handle(f.command("checkout.session.completed", completed("cs_2")))
            .await
            .unwrap();
        let HandleStripeWebhookResult::TicketConfirmed { rsvp_id: Some(rsvp_id), .. } = result else {
            panic!("expected a confirmed ticket, got {:?}", result);
        };

        let rsvp = f.store.find_rsvp(&rsvp_id).await.unwrap().unwrap();
        assert_eq!(rsvp.payment_id, Some(payment.id));
        let event = EventRepository::find_by_id(&f.store, &event.id).await.unwrap().unwrap();
        assert_eq!(event.rsvp_count, 3);
    }

    #[tokio::test]
    async fn full_event_keeps_payment_succeeded() {
        let f = fixture();
        let member = f.member().await;
        let event = f.event(Some(1)).await;
        let payment = f
            .pending(
                Payment::event_ticket(
                    PaymentId::new(),
                    member.id,
                    event.id,
                    Money::new(4_000, "usd").unwrap(),
                    "Gala ticket",
                    1,
                ),
                "cs_3",
            )
            .await;

        let result = f
            .handler
            .handle(f.command("checkout.session.completed", completed("cs_3")))
            .await
            .unwrap();
        assert_eq!(
            result,
            HandleStripeWebhookResult::TicketConfirmed {
                payment_id: payment.id,
                rsvp_id: None
            }
        );
        let stored = PaymentRepository::find_by_id(&f.store, &payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn unpaid_completion_is_acknowledged_without_changes() {
        let f = fixture();
        let member = f.member().await;
        let payment = f
            .pending(
                Payment::membership(PaymentId::new(), member.id, Money::new(5_000, "usd").unwrap(), "Membership"),
                "cs_4",
            )
            .await;

        let object = json!({ "id": "cs_4", "payment_status": "unpaid" });
        let result = f
            .handler
            .handle(f.command("checkout.session.completed", object))
            .await
            .unwrap();
        assert_eq!(result, HandleStripeWebhookResult::Acknowledged);
        let stored = PaymentRepository::find_by_id(&f.store, &payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn expired_session_marks_payment_expired() {
        let f = fixture();
        let member = f.member().await;
        let payment = f
            .pending(
                Payment::membership(PaymentId::new(), member.id, Money::new(5_000, "usd").unwrap(), "Membership"),
                "cs_5",
            )
            .await;

        let result = f
            .handler
            .handle(f.command("checkout.session.expired", json!({ "id": "cs_5" })))
            .await
            .unwrap();
        assert_eq!(
            result,
            HandleStripeWebhookResult::CheckoutExpired {
                payment_id: payment.id
            }
        );

        // A late completion cannot resurrect it.
        let late = f
            .handler
            .handle(f.command("checkout.session.completed", completed("cs_5")))
            .await
            .unwrap();
        assert_eq!(late, HandleStripeWebhookResult::Acknowledged);
        let stored = PaymentRepository::find_by_id(&f.store, &payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Expired);
    }

    #[tokio::test]
    async fn failed_async_payment_marks_payment_failed() {
        let f = fixture();
        let member = f.member().await;
        let payment = f
            .pending(
                Payment::membership(PaymentId::new(), member.id, Money::new(5_000, "usd").unwrap(), "Membership"),
                "cs_fail",
            )
            .await;

        let result = f
            .handler
            .handle(f.command("checkout.session.async_payment_failed", json!({ "id": "cs_fail" })))
            .await
            .unwrap();
        assert_eq!(
            result,
            HandleStripeWebhookResult::CheckoutFailed {
                payment_id: payment.id
            }
        );
        let stored = PaymentRepository::find_by_id(&f.store, &payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
        let member = MemberRepository::find_by_id(&f.store, &member.id).await.unwrap().unwrap();
        assert_eq!(member.status, MembershipStatus::Pending);

        let again = f
            .handler
            .handle(f.command("checkout.session.async_payment_failed", json!({ "id": "cs_fail" })))
            .await
            .unwrap();
        assert_eq!(again, HandleStripeWebhookResult::Acknowledged);
    }

    #[tokio::test]
    async fn full_refund_from_stripe_cancels_membership() {
        let f = fixture();
        let member = f.member().await;
        f.pending(
            Payment::membership(PaymentId::new(), member.id, Money::new(5_000, "usd").unwrap(), "Membership"),
            "cs_6",
        )
        .await;
        f.handler
            .handle(f.command("checkout.session.completed", completed("cs_6")))
            .await
            .unwrap();

        let charge = json!({ "id": "ch_1", "payment_intent": "pi_123", "amount_refunded": 5000 });
        let result = f
            .handler
            .handle(f.command("charge.refunded", charge.clone()))
            .await
            .unwrap();
        assert!(matches!(
            result,
            HandleStripeWebhookResult::RefundRecorded {
                fully_refunded: true,
                ..
            }
        ));
        let member = MemberRepository::find_by_id(&f.store, &member.id).await.unwrap().unwrap();
        assert_eq!(member.status, MembershipStatus::Cancelled);

        let replay = f.handler.handle(f.command("charge.refunded", charge)).await.unwrap();
        assert_eq!(replay, HandleStripeWebhookResult::Acknowledged);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let f = fixture();
        let mut cmd = f.command("checkout.session.completed", completed("cs_7"));
        cmd.signature = "t=1,v1=deadbeef".into();
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidWebhookSignature);
    }

    #[tokio::test]
    async fn unhandled_event_types_are_ignored() {
        let f = fixture();
        let result = f
            .handler
            .handle(f.command("customer.created", json!({ "id": "cus_1" })))
            .await
            .unwrap();
        assert_eq!(result, HandleStripeWebhookResult::Ignored);
    }
}
