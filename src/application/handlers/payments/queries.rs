//! Payment queries for the back office and for members.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, PaymentId};
use crate::domain::payment::Payment;
use crate::ports::{Page, Paginated, PaymentFilter, PaymentRepository};

#[derive(Debug, Clone, Default)]
pub struct ListPaymentsQuery {
    pub filter: PaymentFilter,
    pub page: Page,
}

pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Paginated<Payment>, DomainError> {
        self.payments.list(&query.filter, query.page).await
    }
}

pub struct GetPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl GetPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, id: PaymentId) -> Result<Payment, DomainError> {
        self.payments
            .find_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::PaymentNotFound, "Payment not found"))
    }
}

/// A member's own payment history, newest first.
pub struct ListMemberPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListMemberPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, member_id: MemberId) -> Result<Vec<Payment>, DomainError> {
        let mut payments = self.payments.list_for_member(&member_id).await?;
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }
}
