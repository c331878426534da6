//! What a full refund undoes.
//!
//! A fully refunded membership payment cancels the membership; a fully
//! refunded ticket cancels the reservation it paid for and frees its seats.
//! Runs for refunds issued here and for refunds reported by Stripe.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{Payment, PaymentPurpose};
use crate::ports::{EventRepository, MemberRepository};

#[derive(Clone)]
pub struct RefundEffects {
    members: Arc<dyn MemberRepository>,
    events: Arc<dyn EventRepository>,
}

impl RefundEffects {
    pub fn new(members: Arc<dyn MemberRepository>, events: Arc<dyn EventRepository>) -> Self {
        Self { members, events }
    }

    pub async fn apply(&self, payment: &Payment) -> Result<(), DomainError> {
        let Some(member_id) = payment.member_id else {
            return Ok(());
        };

        match payment.purpose {
            PaymentPurpose::Membership => {
                let Some(mut member) = self.members.find_by_id(&member_id).await? else {
                    return Ok(());
                };
                match member.cancel_membership() {
                    Ok(()) => {
                        self.members.update(&member).await?;
                        tracing::info!(
                            payment_id = %payment.id,
                            member_id = %member.id,
                            "Membership cancelled after full refund"
                        );
                    }
                    Err(e) => {
                        tracing::debug!(
                            member_id = %member.id,
                            status = %member.status,
                            reason = %e,
                            "Membership left unchanged by refund"
                        );
                    }
                }
            }
            PaymentPurpose::EventTicket => {
                let Some(event_id) = payment.event_id else {
                    return Ok(());
                };
                let rsvp = self
                    .events
                    .find_confirmed_rsvp(&event_id, &member_id)
                    .await?
                    .filter(|r| r.payment_id == Some(payment.id));
                if let Some(rsvp) = rsvp {
                    match self.events.cancel_rsvp(&rsvp.id).await {
                        Ok(event) => tracing::info!(
                            payment_id = %payment.id,
                            rsvp_id = %rsvp.id,
                            rsvp_count = event.rsvp_count,
                            "Reservation cancelled after full refund"
                        ),
                        Err(e) if e.code == ErrorCode::EventNotFound => {}
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        Ok(())
    }
}
