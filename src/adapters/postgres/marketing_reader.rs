//! PostgreSQL read model for marketing statistics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, EventId, ReferralSourceId, Timestamp};
use crate::domain::marketing::{EventAttendance, MemberFact, PaymentFact};
use crate::domain::member::MembershipStatus;
use crate::domain::payment::{PaymentPurpose, PaymentStatus};
use crate::ports::MarketingReader;

use super::{corrupt, db_error, to_u32};

pub struct PostgresMarketingReader {
    pool: PgPool,
}

impl PostgresMarketingReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberFactRow {
    status: String,
    referral_source_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    converted: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentFactRow {
    purpose: String,
    status: String,
    amount_cents: i64,
    refunded_cents: i64,
    paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    title: String,
    starts_at: DateTime<Utc>,
    capacity: Option<i32>,
    rsvp_count: i32,
    checked_in_count: i32,
}

impl TryFrom<AttendanceRow> for EventAttendance {
    type Error = DomainError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let capacity = row.capacity.map(|c| to_u32("capacity", c)).transpose()?;
        let rsvp_count = to_u32("rsvp_count", row.rsvp_count)?;
        Ok(EventAttendance {
            event_id: EventId::from_uuid(row.id),
            title: row.title,
            starts_at: Timestamp::from_datetime(row.starts_at),
            capacity,
            rsvp_count,
            checked_in_count: to_u32("checked_in_count", row.checked_in_count)?,
            utilization: capacity.map(|c| f64::from(rsvp_count) / f64::from(c.max(1))),
        })
    }
}

#[async_trait]
impl MarketingReader for PostgresMarketingReader {
    async fn member_facts(&self) -> Result<Vec<MemberFact>, DomainError> {
        let rows: Vec<MemberFactRow> = sqlx::query_as(
            r#"
            SELECT m.status, m.referral_source_id, m.created_at,
                   EXISTS (
                       SELECT 1 FROM payments p
                       WHERE p.member_id = m.id
                         AND p.purpose = 'membership'
                         AND p.status IN ('succeeded', 'partially_refunded', 'refunded')
                   ) AS converted
            FROM members m
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load member facts", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(MemberFact {
                    status: row
                        .status
                        .parse::<MembershipStatus>()
                        .map_err(|_| corrupt("status", &row.status))?,
                    referral_source_id: row.referral_source_id.map(ReferralSourceId::from_uuid),
                    created_at: Timestamp::from_datetime(row.created_at),
                    converted: row.converted,
                })
            })
            .collect()
    }

    async fn payment_facts(&self) -> Result<Vec<PaymentFact>, DomainError> {
        let rows: Vec<PaymentFactRow> = sqlx::query_as(
            "SELECT purpose, status, amount_cents, refunded_cents, paid_at FROM payments",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load payment facts", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(PaymentFact {
                    purpose: row
                        .purpose
                        .parse::<PaymentPurpose>()
                        .map_err(|_| corrupt("purpose", &row.purpose))?,
                    status: row
                        .status
                        .parse::<PaymentStatus>()
                        .map_err(|_| corrupt("status", &row.status))?,
                    amount_cents: row.amount_cents,
                    refunded_cents: row.refunded_cents,
                    paid_at: row.paid_at.map(Timestamp::from_datetime),
                })
            })
            .collect()
    }

    async fn event_attendance(&self) -> Result<Vec<EventAttendance>, DomainError> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT id, title, starts_at, capacity, rsvp_count, checked_in_count
            FROM events
            ORDER BY starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load event attendance", e))?;
        rows.into_iter().map(EventAttendance::try_from).collect()
    }
}
