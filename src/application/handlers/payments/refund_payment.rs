//! RefundPaymentHandler - Admin-issued full or partial refund.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{AdminUserId, DomainError, ErrorCode, PaymentId};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{
    CreateRefundRequest, EventRepository, MemberRepository, PaymentProvider, PaymentRepository,
    RefundReason,
};

use super::RefundEffects;

#[derive(Debug, Clone)]
pub struct RefundPaymentCommand {
    pub payment_id: PaymentId,
    /// Defaults to everything still refundable.
    pub amount_cents: Option<i64>,
    pub reason: Option<RefundReason>,
    pub requested_by: AdminUserId,
}

#[derive(Debug, Clone)]
pub struct RefundPaymentResult {
    pub payment: Payment,
    pub refund_id: String,
    pub refunded_now_cents: i64,
    pub fully_refunded: bool,
}

pub struct RefundPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    provider: Arc<dyn PaymentProvider>,
    refund_effects: RefundEffects,
}

impl RefundPaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        provider: Arc<dyn PaymentProvider>,
        members: Arc<dyn MemberRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            payments,
            provider,
            refund_effects: RefundEffects::new(members, events),
        }
    }

    async fn load(&self, id: &PaymentId) -> Result<Payment, DomainError> {
        self.payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::PaymentNotFound, "Payment not found"))
    }

    pub async fn handle(&self, cmd: RefundPaymentCommand) -> Result<RefundPaymentResult, DomainError> {
        let payment = self.load(&cmd.payment_id).await?;

        let cents = payment.validate_refund(cmd.amount_cents)?;
        let payment_intent_id = payment.payment_intent_id.clone().ok_or_else(|| {
            DomainError::new(
                ErrorCode::PaymentNotRefundable,
                "Payment has no Stripe charge to refund",
            )
        })?;

        let metadata = HashMap::from([
            ("payment_id".to_string(), payment.id.to_string()),
            ("requested_by".to_string(), cmd.requested_by.to_string()),
        ]);
        let refund = self
            .provider
            .create_refund(CreateRefundRequest {
                payment_intent_id,
                amount_cents: cents,
                reason: cmd.reason,
                idempotency_key: format!("refund-{}-{}", payment.id, payment.refunded_cents),
                metadata,
            })
            .await
            .map_err(|e| {
                tracing::error!(payment_id = %payment.id, error = %e, "Stripe refund failed");
                DomainError::from(e)
            })?;

        // A charge.refunded webhook may have recorded this refund already.
        let expected_total = payment.refunded_cents + cents;
        let mut payment = self.load(&cmd.payment_id).await?;
        match payment.sync_refunded_total(expected_total)? {
            Some(applied) => {
                self.payments.update(&payment).await?;
                tracing::info!(
                    payment_id = %payment.id,
                    refund_id = %refund.id,
                    refunded_now_cents = cents,
                    total_refunded_cents = applied.total_refunded_cents,
                    requested_by = %cmd.requested_by,
                    "Payment refunded"
                );
                if applied.fully_refunded {
                    self.refund_effects.apply(&payment).await?;
                }
            }
            None => {
                tracing::info!(
                    payment_id = %payment.id,
                    refund_id = %refund.id,
                    total_refunded_cents = payment.refunded_cents,
                    "Refund already recorded from Stripe"
                );
            }
        }

        let fully_refunded = payment.status == PaymentStatus::Refunded;
        Ok(RefundPaymentResult {
            payment,
            refund_id: refund.id,
            refunded_now_cents: cents,
            fully_refunded,
        })
    }
}
