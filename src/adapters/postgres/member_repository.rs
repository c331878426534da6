//! PostgreSQL implementation of MemberRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, Email, ErrorCode, MemberId, ReferralSourceId, Timestamp,
};
use crate::domain::member::{Member, MembershipStatus};
use crate::ports::{MemberFilter, MemberRepository, Page, Paginated};

use super::{corrupt, db_error, violates};

pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    referral_source_id: Option<Uuid>,
    status: String,
    membership_expires_at: Option<DateTime<Utc>>,
    stripe_customer_id: Option<String>,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member {
            id: MemberId::from_uuid(row.id),
            email: Email::parse(&row.email).map_err(|_| corrupt("email", &row.email))?,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            referral_source_id: row.referral_source_id.map(ReferralSourceId::from_uuid),
            status: row
                .status
                .parse::<MembershipStatus>()
                .map_err(|_| corrupt("status", &row.status))?,
            membership_expires_at: row.membership_expires_at.map(Timestamp::from_datetime),
            stripe_customer_id: row.stripe_customer_id,
            admin_notes: row.admin_notes,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_MEMBER: &str = r#"
    SELECT id, email, password_hash, first_name, last_name, phone, referral_source_id,
           status, membership_expires_at, stripe_customer_id, admin_notes,
           created_at, updated_at
    FROM members
"#;

fn member_exists() -> DomainError {
    DomainError::new(
        ErrorCode::MemberExists,
        "An account with this email already exists",
    )
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &MemberFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" AND (LOWER(first_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(last_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR email LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn save(&self, member: &Member) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, email, password_hash, first_name, last_name, phone, referral_source_id,
                status, membership_expires_at, stripe_customer_id, admin_notes,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(member.id.as_uuid())
        .bind(member.email.as_str())
        .bind(&member.password_hash)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.phone)
        .bind(member.referral_source_id.map(|id| *id.as_uuid()))
        .bind(member.status.as_str())
        .bind(member.membership_expires_at.map(|t| *t.as_datetime()))
        .bind(&member.stripe_customer_id)
        .bind(&member.admin_notes)
        .bind(member.created_at.as_datetime())
        .bind(member.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "members_email_key") {
                return member_exists();
            }
            db_error("Failed to save member", e)
        })?;

        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE members SET
                email = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                phone = $6,
                referral_source_id = $7,
                status = $8,
                membership_expires_at = $9,
                stripe_customer_id = $10,
                admin_notes = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(member.id.as_uuid())
        .bind(member.email.as_str())
        .bind(&member.password_hash)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.phone)
        .bind(member.referral_source_id.map(|id| *id.as_uuid()))
        .bind(member.status.as_str())
        .bind(member.membership_expires_at.map(|t| *t.as_datetime()))
        .bind(&member.stripe_customer_id)
        .bind(&member.admin_notes)
        .bind(member.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "members_email_key") {
                return member_exists();
            }
            db_error("Failed to update member", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::MemberNotFound, "Member not found"));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_MEMBER))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch member", e))?;

        row.map(Member::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> =
            sqlx::query_as(&format!("{} WHERE email = $1", SELECT_MEMBER))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch member", e))?;

        row.map(Member::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &MemberFilter,
        page: Page,
    ) -> Result<Paginated<Member>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM members");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count members", e))?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_MEMBER);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows: Vec<MemberRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list members", e))?;

        let members = rows
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(members, total, page))
    }

    async fn delete(&self, id: &MemberId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete member", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::MemberNotFound, "Member not found"));
        }
        Ok(())
    }

    async fn expire_lapsed(&self, now: &Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE members SET status = 'expired', updated_at = now()
            WHERE status = 'active'
              AND (membership_expires_at IS NULL OR membership_expires_at <= $1)
            "#,
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to expire lapsed memberships", e))?;
        Ok(result.rows_affected())
    }
}
