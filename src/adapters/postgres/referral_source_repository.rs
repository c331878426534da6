//! PostgreSQL implementation of ReferralSourceRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ReferralSourceId, Timestamp};
use crate::domain::marketing::ReferralSource;
use crate::ports::ReferralSourceRepository;

use super::{db_error, violates};

pub struct PostgresReferralSourceRepository {
    pool: PgPool,
}

impl PostgresReferralSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReferralSourceRow {
    id: Uuid,
    name: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<ReferralSourceRow> for ReferralSource {
    fn from(row: ReferralSourceRow) -> Self {
        ReferralSource {
            id: ReferralSourceId::from_uuid(row.id),
            name: row.name,
            active: row.active,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

fn source_exists() -> DomainError {
    DomainError::new(
        ErrorCode::ReferralSourceExists,
        "A referral source with this name already exists",
    )
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::ReferralSourceNotFound, "Referral source not found")
}

#[async_trait]
impl ReferralSourceRepository for PostgresReferralSourceRepository {
    async fn save(&self, source: &ReferralSource) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO referral_sources (id, name, name_key, active, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(source.id.as_uuid())
        .bind(&source.name)
        .bind(source.name_key())
        .bind(source.active)
        .bind(source.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "referral_sources_name_key_key") {
                return source_exists();
            }
            db_error("Failed to save referral source", e)
        })?;
        Ok(())
    }

    async fn update(&self, source: &ReferralSource) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE referral_sources SET name = $2, name_key = $3, active = $4 WHERE id = $1",
        )
        .bind(source.id.as_uuid())
        .bind(&source.name)
        .bind(source.name_key())
        .bind(source.active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "referral_sources_name_key_key") {
                return source_exists();
            }
            db_error("Failed to update referral source", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ReferralSourceId,
    ) -> Result<Option<ReferralSource>, DomainError> {
        let row: Option<ReferralSourceRow> = sqlx::query_as(
            "SELECT id, name, active, created_at FROM referral_sources WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch referral source", e))?;
        Ok(row.map(ReferralSource::from))
    }

    async fn list(&self, active_only: bool) -> Result<Vec<ReferralSource>, DomainError> {
        let rows: Vec<ReferralSourceRow> = sqlx::query_as(
            r#"
            SELECT id, name, active, created_at FROM referral_sources
            WHERE active OR NOT $1
            ORDER BY name_key
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list referral sources", e))?;
        Ok(rows.into_iter().map(ReferralSource::from).collect())
    }

    async fn usage_count(&self, id: &ReferralSourceId) -> Result<u64, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE referral_source_id = $1")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count referral usage", e))?;
        Ok(count as u64)
    }

    async fn delete(&self, id: &ReferralSourceId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM referral_sources WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete referral source", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }
}
