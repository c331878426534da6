use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::marketing::{EventAttendance, MemberFact, PaymentFact};
use crate::domain::payment::PaymentPurpose;
use crate::ports::MarketingReader;

use super::InMemoryStore;

#[async_trait]
impl MarketingReader for InMemoryStore {
    async fn member_facts(&self) -> Result<Vec<MemberFact>, DomainError> {
        let tables = self.tables.read().await;
        let converted: HashSet<_> = tables
            .payments
            .values()
            .filter(|p| p.purpose == PaymentPurpose::Membership && p.status.was_paid())
            .filter_map(|p| p.member_id)
            .collect();

        Ok(tables
            .members
            .values()
            .map(|m| MemberFact {
                status: m.status,
                referral_source_id: m.referral_source_id,
                created_at: m.created_at,
                converted: converted.contains(&m.id),
            })
            .collect())
    }

    async fn payment_facts(&self) -> Result<Vec<PaymentFact>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .map(|p| PaymentFact {
                purpose: p.purpose,
                status: p.status,
                amount_cents: p.amount.amount_cents(),
                refunded_cents: p.refunded_cents,
                paid_at: p.paid_at,
            })
            .collect())
    }

    async fn event_attendance(&self) -> Result<Vec<EventAttendance>, DomainError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<EventAttendance> =
            tables.events.values().map(EventAttendance::from).collect();
        rows.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(rows)
    }
}
