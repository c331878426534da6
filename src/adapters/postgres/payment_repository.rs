//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, MemberId, Money, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentPurpose, PaymentStatus};
use crate::ports::{Page, Paginated, PaymentFilter, PaymentRepository};

use super::{corrupt, db_error, to_u32, violates};

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE {} = $1", SELECT_PAYMENT, column))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch payment", e))?;
        row.map(Payment::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    member_id: Option<Uuid>,
    event_id: Option<Uuid>,
    purpose: String,
    amount_cents: i64,
    currency: String,
    refunded_cents: i64,
    status: String,
    checkout_session_id: Option<String>,
    payment_intent_id: Option<String>,
    description: String,
    guests: i32,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            member_id: row.member_id.map(MemberId::from_uuid),
            event_id: row.event_id.map(EventId::from_uuid),
            purpose: row
                .purpose
                .parse::<PaymentPurpose>()
                .map_err(|_| corrupt("purpose", &row.purpose))?,
            amount: Money::new(row.amount_cents, &row.currency)
                .map_err(|_| corrupt("amount", format!("{} {}", row.amount_cents, row.currency)))?,
            refunded_cents: row.refunded_cents,
            status: row
                .status
                .parse::<PaymentStatus>()
                .map_err(|_| corrupt("status", &row.status))?,
            checkout_session_id: row.checkout_session_id,
            payment_intent_id: row.payment_intent_id,
            description: row.description,
            guests: to_u32("guests", row.guests)?,
            created_at: Timestamp::from_datetime(row.created_at),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_PAYMENT: &str = r#"
    SELECT id, member_id, event_id, purpose, amount_cents, currency, refunded_cents, status,
           checkout_session_id, payment_intent_id, description, guests,
           created_at, paid_at, updated_at
    FROM payments
"#;

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PaymentFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(purpose) = filter.purpose {
        builder.push(" AND purpose = ").push_bind(purpose.as_str());
    }
    if let Some(member_id) = filter.member_id {
        builder.push(" AND member_id = ").push_bind(*member_id.as_uuid());
    }
}

fn checkout_session_taken(e: &sqlx::Error) -> Option<DomainError> {
    violates(e, "payments_checkout_session_key").then(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            "Checkout session is already linked to another payment",
        )
    })
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, member_id, event_id, purpose, amount_cents, currency, refunded_cents, status,
                checkout_session_id, payment_intent_id, description, guests,
                created_at, paid_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.member_id.map(|id| *id.as_uuid()))
        .bind(payment.event_id.map(|id| *id.as_uuid()))
        .bind(payment.purpose.as_str())
        .bind(payment.amount.amount_cents())
        .bind(payment.amount.currency())
        .bind(payment.refunded_cents)
        .bind(payment.status.as_str())
        .bind(&payment.checkout_session_id)
        .bind(&payment.payment_intent_id)
        .bind(&payment.description)
        .bind(payment.guests as i32)
        .bind(payment.created_at.as_datetime())
        .bind(payment.paid_at.map(|t| *t.as_datetime()))
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| checkout_session_taken(&e).unwrap_or_else(|| db_error("Failed to save payment", e)))?;
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                member_id = $2,
                event_id = $3,
                refunded_cents = $4,
                status = $5,
                checkout_session_id = $6,
                payment_intent_id = $7,
                description = $8,
                paid_at = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.member_id.map(|id| *id.as_uuid()))
        .bind(payment.event_id.map(|id| *id.as_uuid()))
        .bind(payment.refunded_cents)
        .bind(payment.status.as_str())
        .bind(&payment.checkout_session_id)
        .bind(&payment.payment_intent_id)
        .bind(&payment.description)
        .bind(payment.paid_at.map(|t| *t.as_datetime()))
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| checkout_session_taken(&e).unwrap_or_else(|| db_error("Failed to update payment", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::PaymentNotFound, "Payment not found"));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PAYMENT))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch payment", e))?;
        row.map(Payment::try_from).transpose()
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        self.find_one("checkout_session_id", session_id).await
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        self.find_one("payment_intent_id", payment_intent_id).await
    }

    async fn list(
        &self,
        filter: &PaymentFilter,
        page: Page,
    ) -> Result<Paginated<Payment>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM payments");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count payments", e))?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_PAYMENT);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows: Vec<PaymentRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list payments", e))?;

        let payments = rows
            .into_iter()
            .map(Payment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(payments, total, page))
    }

    async fn list_for_member(&self, member_id: &MemberId) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "{} WHERE member_id = $1 ORDER BY created_at DESC",
            SELECT_PAYMENT
        ))
        .bind(member_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list member payments", e))?;
        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn detach_member(&self, member_id: &MemberId) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE payments SET member_id = NULL, updated_at = NOW() WHERE member_id = $1",
        )
        .bind(member_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to detach member payments", e))?;
        Ok(result.rows_affected())
    }
}
