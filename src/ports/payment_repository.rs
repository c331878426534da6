//! Payment repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MemberId, PaymentId};
use crate::domain::payment::{Payment, PaymentPurpose, PaymentStatus};

use super::{Page, Paginated};

/// Admin list filter.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub purpose: Option<PaymentPurpose>,
    pub member_id: Option<MemberId>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.status.map_or(true, |s| payment.status == s)
            && self.purpose.map_or(true, |p| payment.purpose == p)
            && self
                .member_id
                .map_or(true, |m| payment.member_id == Some(m))
    }
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    async fn update(&self, payment: &Payment) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Newest first.
    async fn list(&self, filter: &PaymentFilter, page: Page)
        -> Result<Paginated<Payment>, DomainError>;

    /// A member's own payments, newest first.
    async fn list_for_member(&self, member_id: &MemberId) -> Result<Vec<Payment>, DomainError>;

    /// Clears the member reference on every payment of a deleted member.
    async fn detach_member(&self, member_id: &MemberId) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }

    #[test]
    fn filter_matches_each_field() {
        let member = MemberId::new();
        let payment = Payment::membership(
            PaymentId::new(),
            member,
            Money::new(100, "usd").unwrap(),
            "Membership",
        );
        assert!(PaymentFilter::default().matches(&payment));
        assert!(PaymentFilter {
            member_id: Some(member),
            purpose: Some(PaymentPurpose::Membership),
            status: Some(PaymentStatus::Pending),
        }
        .matches(&payment));
        assert!(!PaymentFilter {
            purpose: Some(PaymentPurpose::EventTicket),
            ..Default::default()
        }
        .matches(&payment));
        assert!(!PaymentFilter {
            member_id: Some(MemberId::new()),
            ..Default::default()
        }
        .matches(&payment));
    }
}
