use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, PaymentId};
use crate::domain::payment::Payment;
use crate::ports::{Page, Paginated, PaymentFilter, PaymentRepository};

use super::InMemoryStore;

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        self.tables.write().await.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .payments
            .get_mut(&payment.id)
            .ok_or_else(|| DomainError::new(ErrorCode::PaymentNotFound, "Payment not found"))?;
        *stored = payment.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.tables.read().await.payments.get(id).cloned())
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .find(|p| p.checkout_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .find(|p| p.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }

    async fn list(
        &self,
        filter: &PaymentFilter,
        page: Page,
    ) -> Result<Paginated<Payment>, DomainError> {
        let tables = self.tables.read().await;
        let mut payments: Vec<Payment> = tables
            .payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = payments.len() as i64;
        Ok(Paginated::new(page.slice(&payments), total, page))
    }

    async fn list_for_member(&self, member_id: &MemberId) -> Result<Vec<Payment>, DomainError> {
        let filter = PaymentFilter {
            member_id: Some(*member_id),
            ..Default::default()
        };
        let tables = self.tables.read().await;
        let mut payments: Vec<Payment> = tables
            .payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn detach_member(&self, member_id: &MemberId) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().await;
        let mut detached = 0;
        for payment in tables
            .payments
            .values_mut()
            .filter(|p| p.member_id.as_ref() == Some(member_id))
        {
            payment.detach_member();
            detached += 1;
        }
        Ok(detached)
    }
}
