//! PostgreSQL implementation of AdminUserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::admin::{last_administrator, AdminUser};
use crate::domain::foundation::{AdminRole, AdminUserId, DomainError, Email, ErrorCode, Timestamp};
use crate::ports::AdminUserRepository;

use super::{corrupt, db_error, violates};

pub struct PostgresAdminUserRepository {
    pool: PgPool,
}

impl PostgresAdminUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))
    }
}

/// Locks every administrator row, so concurrent demotions and deletions run
/// one after another, then refuses to remove the last one.
async fn guard_last_administrator(
    tx: &mut Transaction<'_, Postgres>,
    id: &AdminUserId,
) -> Result<(), DomainError> {
    let administrators: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM admin_users WHERE role = $1 FOR UPDATE")
            .bind(AdminRole::Administrator.as_str())
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to lock administrators", e))?;
    if administrators.len() <= 1 && administrators.contains(id.as_uuid()) {
        return Err(last_administrator());
    }
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = DomainError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        Ok(AdminUser {
            id: AdminUserId::from_uuid(row.id),
            email: Email::parse(&row.email).map_err(|_| corrupt("email", &row.email))?,
            name: row.name,
            password_hash: row.password_hash,
            role: row
                .role
                .parse::<AdminRole>()
                .map_err(|_| corrupt("role", &row.role))?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_ADMIN: &str =
    "SELECT id, email, name, password_hash, role, created_at, updated_at FROM admin_users";

fn admin_exists() -> DomainError {
    DomainError::new(
        ErrorCode::AdminUserExists,
        "An admin user with this email already exists",
    )
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::AdminUserNotFound, "Admin user not found")
}

#[async_trait]
impl AdminUserRepository for PostgresAdminUserRepository {
    async fn save(&self, user: &AdminUser) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO admin_users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at.as_datetime())
        .bind(user.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "admin_users_email_key") {
                return admin_exists();
            }
            db_error("Failed to save admin user", e)
        })?;
        Ok(())
    }

    async fn update(&self, user: &AdminUser) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        if user.role != AdminRole::Administrator {
            guard_last_administrator(&mut tx, &user.id).await?;
        }
        let result = sqlx::query(
            r#"
            UPDATE admin_users SET
                email = $2, name = $3, password_hash = $4, role = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "admin_users_email_key") {
                return admin_exists();
            }
            db_error("Failed to update admin user", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }

    async fn find_by_id(&self, id: &AdminUserId) -> Result<Option<AdminUser>, DomainError> {
        let row: Option<AdminUserRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_ADMIN))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch admin user", e))?;
        row.map(AdminUser::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<AdminUser>, DomainError> {
        let row: Option<AdminUserRow> =
            sqlx::query_as(&format!("{} WHERE email = $1", SELECT_ADMIN))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch admin user", e))?;
        row.map(AdminUser::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<AdminUser>, DomainError> {
        let rows: Vec<AdminUserRow> =
            sqlx::query_as(&format!("{} ORDER BY created_at", SELECT_ADMIN))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Failed to list admin users", e))?;
        rows.into_iter().map(AdminUser::try_from).collect()
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count admin users", e))?;
        Ok(count as u64)
    }

    async fn count_with_role(&self, role: AdminRole) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count admin users", e))?;
        Ok(count as u64)
    }

    async fn delete(&self, id: &AdminUserId) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        guard_last_administrator(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete admin user", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }
}
