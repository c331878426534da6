//! Read-side port feeding marketing statistics.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::marketing::{EventAttendance, MemberFact, PaymentFact};

/// Loads flat facts; aggregation happens in `compile_stats`.
#[async_trait]
pub trait MarketingReader: Send + Sync {
    async fn member_facts(&self) -> Result<Vec<MemberFact>, DomainError>;

    async fn payment_facts(&self) -> Result<Vec<PaymentFact>, DomainError>;

    async fn event_attendance(&self) -> Result<Vec<EventAttendance>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marketing_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn MarketingReader) {}
    }
}
