//! Payment aggregate.
//!
//! # Invariants
//!
//! - `0 <= refunded_cents <= amount`
//! - event ticket payments always reference an event
//! - status changes follow [`PaymentStatus`] transitions

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, MemberId, Money, PaymentId, StateMachine, Timestamp,
};

use super::{PaymentPurpose, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: PaymentId,
    /// Cleared when the member is deleted; the payment keeps its history.
    pub member_id: Option<MemberId>,
    pub event_id: Option<EventId>,
    pub purpose: PaymentPurpose,
    pub amount: Money,
    pub refunded_cents: i64,
    pub status: PaymentStatus,
    pub checkout_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub description: String,
    /// Guests covered by an event ticket.
    pub guests: u32,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Effect of a refund on the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundApplied {
    pub refunded_now_cents: i64,
    pub total_refunded_cents: i64,
    pub fully_refunded: bool,
}

impl Payment {
    pub fn membership(
        id: PaymentId,
        member_id: MemberId,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        Self::pending(id, member_id, None, PaymentPurpose::Membership, amount, description, 0)
    }

    pub fn event_ticket(
        id: PaymentId,
        member_id: MemberId,
        event_id: EventId,
        amount: Money,
        description: impl Into<String>,
        guests: u32,
    ) -> Self {
        Self::pending(
            id,
            member_id,
            Some(event_id),
            PaymentPurpose::EventTicket,
            amount,
            description,
            guests,
        )
    }

    fn pending(
        id: PaymentId,
        member_id: MemberId,
        event_id: Option<EventId>,
        purpose: PaymentPurpose,
        amount: Money,
        description: impl Into<String>,
        guests: u32,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            member_id: Some(member_id),
            event_id,
            purpose,
            amount,
            refunded_cents: 0,
            status: PaymentStatus::Pending,
            checkout_session_id: None,
            payment_intent_id: None,
            description: description.into(),
            guests,
            created_at: now,
            paid_at: None,
            updated_at: now,
        }
    }

    pub fn attach_checkout_session(&mut self, session_id: impl Into<String>) {
        self.checkout_session_id = Some(session_id.into());
        self.updated_at = Timestamp::now();
    }

    /// Marks the payment as paid.
    ///
    /// Returns `Ok(false)` when it was already paid, so redelivered webhooks
    /// cause no further side effects.
    pub fn mark_succeeded(
        &mut self,
        payment_intent_id: Option<String>,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        if self.status.was_paid() {
            return Ok(false);
        }
        self.status = self.transition(PaymentStatus::Succeeded)?;
        if payment_intent_id.is_some() {
            self.payment_intent_id = payment_intent_id;
        }
        self.paid_at = Some(now);
        self.updated_at = Timestamp::now();
        Ok(true)
    }

    /// Expires a pending payment. Returns `false` if it was no longer pending.
    pub fn mark_expired(&mut self) -> bool {
        self.settle_pending(PaymentStatus::Expired)
    }

    pub fn mark_failed(&mut self) -> bool {
        self.settle_pending(PaymentStatus::Failed)
    }

    fn settle_pending(&mut self, outcome: PaymentStatus) -> bool {
        if self.status != PaymentStatus::Pending {
            return false;
        }
        self.status = outcome;
        self.updated_at = Timestamp::now();
        true
    }

    /// Amount still refundable, in cents.
    pub fn refundable_cents(&self) -> i64 {
        if matches!(self.status, PaymentStatus::Succeeded | PaymentStatus::PartiallyRefunded) {
            self.amount.amount_cents() - self.refunded_cents
        } else {
            0
        }
    }

    /// Amount kept after refunds.
    pub fn net_cents(&self) -> i64 {
        if self.status.was_paid() {
            self.amount.amount_cents() - self.refunded_cents
        } else {
            0
        }
    }

    /// Checks a refund request; `None` means everything still refundable.
    pub fn validate_refund(&self, requested_cents: Option<i64>) -> Result<i64, DomainError> {
        let remaining = self.refundable_cents();
        if remaining == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotRefundable,
                "Payment has nothing left to refund",
            )
            .with_detail("status", self.status.as_str()));
        }
        let cents = requested_cents.unwrap_or(remaining);
        if cents <= 0 || cents > remaining {
            return Err(DomainError::validation(
                "amount_cents",
                format!("Refund must be between 1 and {} cents", remaining),
            ));
        }
        Ok(cents)
    }

    /// Records a refund issued through this service.
    pub fn apply_refund(&mut self, cents: i64) -> Result<RefundApplied, DomainError> {
        let cents = self.validate_refund(Some(cents))?;
        self.set_refunded_total(self.refunded_cents + cents)?;
        Ok(RefundApplied {
            refunded_now_cents: cents,
            total_refunded_cents: self.refunded_cents,
            fully_refunded: self.status == PaymentStatus::Refunded,
        })
    }

    /// Mirrors the refunded total reported by Stripe (`charge.refunded`).
    ///
    /// Returns `None` when Stripe reports nothing new.
    pub fn sync_refunded_total(
        &mut self,
        total_refunded_cents: i64,
    ) -> Result<Option<RefundApplied>, DomainError> {
        let total = total_refunded_cents.min(self.amount.amount_cents());
        if total <= self.refunded_cents {
            return Ok(None);
        }
        let before = self.refunded_cents;
        self.set_refunded_total(total)?;
        Ok(Some(RefundApplied {
            refunded_now_cents: total - before,
            total_refunded_cents: total,
            fully_refunded: self.status == PaymentStatus::Refunded,
        }))
    }

    fn set_refunded_total(&mut self, total: i64) -> Result<(), DomainError> {
        let target = if total >= self.amount.amount_cents() {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        self.status = self.transition(target)?;
        self.refunded_cents = total;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Receipts exist once money was collected.
    pub fn has_receipt(&self) -> bool {
        self.status.was_paid()
    }

    pub fn detach_member(&mut self) {
        self.member_id = None;
        self.updated_at = Timestamp::now();
    }

    fn transition(&self, target: PaymentStatus) -> Result<PaymentStatus, DomainError> {
        self.status.transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("payment_id", self.id.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paid(amount: i64) -> Payment {
        let mut payment = Payment::membership(
            PaymentId::new(),
            MemberId::new(),
            Money::new(amount, "usd").unwrap(),
            "Annual membership",
        );
        payment.mark_succeeded(Some("pi_1".into()), Timestamp::now()).unwrap();
        payment
    }

    #[test]
    fn new_payment_is_pending_and_not_refundable() {
        let payment = Payment::membership(
            PaymentId::new(),
            MemberId::new(),
            Money::new(5000, "usd").unwrap(),
            "Annual membership",
        );
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.refundable_cents(), 0);
        assert!(!payment.has_receipt());
    }

    #[test]
    fn mark_succeeded_is_idempotent() {
        let mut payment = paid(5000);
        assert!(!payment.mark_succeeded(Some("pi_2".into()), Timestamp::now()).unwrap());
        assert_eq!(payment.payment_intent_id.as_deref(), Some("pi_1"));
    }

    #[test]
    fn expired_payment_cannot_succeed() {
        let mut payment = Payment::membership(
            PaymentId::new(),
            MemberId::new(),
            Money::new(5000, "usd").unwrap(),
            "Annual membership",
        );
        assert!(payment.mark_expired());
        assert!(!payment.mark_expired());
        let err = payment.mark_succeeded(None, Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn default_refund_is_the_remainder() {
        let payment = paid(5000);
        assert_eq!(payment.validate_refund(None).unwrap(), 5000);
    }

    #[test]
    fn partial_then_full_refund() {
        let mut payment = paid(5000);
        let first = payment.apply_refund(2000).unwrap();
        assert!(!first.fully_refunded);
        assert_eq!(payment.status, PaymentStatus::PartiallyRefunded);
        assert_eq!(payment.refundable_cents(), 3000);

        let second = payment.apply_refund(3000).unwrap();
        assert!(second.fully_refunded);
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(payment.net_cents(), 0);
    }

    #[test]
    fn refund_above_remainder_is_rejected() {
        let mut payment = paid(5000);
        assert_eq!(payment.apply_refund(5001).unwrap_err().code, ErrorCode::ValidationFailed);
        assert_eq!(payment.apply_refund(0).unwrap_err().code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn fully_refunded_payment_is_not_refundable() {
        let mut payment = paid(100);
        payment.apply_refund(100).unwrap();
        assert_eq!(payment.validate_refund(None).unwrap_err().code, ErrorCode::PaymentNotRefundable);
    }

    #[test]
    fn sync_ignores_stale_totals() {
        let mut payment = paid(5000);
        payment.apply_refund(2000).unwrap();
        assert_eq!(payment.sync_refunded_total(2000).unwrap(), None);
        let applied = payment.sync_refunded_total(5000).unwrap().unwrap();
        assert_eq!(applied.refunded_now_cents, 3000);
        assert!(applied.fully_refunded);
    }

    proptest! {
        #[test]
        fn refunds_never_exceed_amount(amount in 1i64..100_000, refunds in proptest::collection::vec(1i64..50_000, 0..8)) {
            let mut payment = paid(amount);
            for cents in refunds {
                let _ = payment.apply_refund(cents);
                prop_assert!(payment.refunded_cents <= amount);
                prop_assert!(payment.refunded_cents >= 0);
                prop_assert_eq!(payment.net_cents(), amount - payment.refunded_cents);
            }
        }
    }
}
