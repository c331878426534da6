//! GetMarketingStatsHandler - Dashboard statistics for a date range.

use std::sync::Arc;

use crate::application::handlers::members::expire_lapsed;
use crate::domain::foundation::DomainError;
use crate::domain::marketing::{compile_stats, DateRange, MarketingStats};
use crate::ports::{MarketingReader, MemberRepository, ReferralSourceRepository};

pub struct GetMarketingStatsHandler {
    reader: Arc<dyn MarketingReader>,
    members: Arc<dyn MemberRepository>,
    sources: Arc<dyn ReferralSourceRepository>,
    currency: String,
}

impl GetMarketingStatsHandler {
    pub fn new(
        reader: Arc<dyn MarketingReader>,
        members: Arc<dyn MemberRepository>,
        sources: Arc<dyn ReferralSourceRepository>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            reader,
            members,
            sources,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self, range: DateRange) -> Result<MarketingStats, DomainError> {
        expire_lapsed(self.members.as_ref()).await?;
        let (sources, members, payments, events) = tokio::try_join!(
            self.sources.list(false),
            self.reader.member_facts(),
            self.reader.payment_facts(),
            self.reader.event_attendance(),
        )?;
        tracing::debug!(
            members = members.len(),
            payments = payments.len(),
            events = events.len(),
            "Compiling marketing statistics"
        );
        Ok(compile_stats(
            range,
            &self.currency,
            &sources,
            &members,
            &payments,
            events,
        ))
    }
}
