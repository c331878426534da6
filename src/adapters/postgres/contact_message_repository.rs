//! PostgreSQL implementation of ContactMessageRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::content::ContactMessage;
use crate::domain::foundation::{ContactMessageId, DomainError, Email, ErrorCode, Timestamp};
use crate::ports::{ContactMessageRepository, Page, Paginated};

use super::{corrupt, db_error};

pub struct PostgresContactMessageRepository {
    pool: PgPool,
}

impl PostgresContactMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactMessageRow> for ContactMessage {
    type Error = DomainError;

    fn try_from(row: ContactMessageRow) -> Result<Self, Self::Error> {
        Ok(ContactMessage {
            id: ContactMessageId::from_uuid(row.id),
            name: row.name,
            email: Email::parse(&row.email).map_err(|_| corrupt("email", &row.email))?,
            subject: row.subject,
            message: row.message,
            read: row.read,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

const SELECT_MESSAGE: &str =
    "SELECT id, name, email, subject, message, read, created_at FROM contact_messages";

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::ContactMessageNotFound, "Contact message not found")
}

#[async_trait]
impl ContactMessageRepository for PostgresContactMessageRepository {
    async fn save(&self, message: &ContactMessage) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contact_messages (id, name, email, subject, message, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(&message.subject)
        .bind(&message.message)
        .bind(message.read)
        .bind(message.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save contact message", e))?;
        Ok(())
    }

    async fn update(&self, message: &ContactMessage) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE contact_messages SET read = $2 WHERE id = $1")
            .bind(message.id.as_uuid())
            .bind(message.read)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update contact message", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ContactMessageId,
    ) -> Result<Option<ContactMessage>, DomainError> {
        let row: Option<ContactMessageRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_MESSAGE))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch contact message", e))?;
        row.map(ContactMessage::try_from).transpose()
    }

    async fn list(&self, page: Page) -> Result<Paginated<ContactMessage>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count contact messages", e))?;

        // Unread first, newest first within each group.
        let rows: Vec<ContactMessageRow> = sqlx::query_as(&format!(
            "{} ORDER BY read ASC, created_at DESC LIMIT $1 OFFSET $2",
            SELECT_MESSAGE
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list contact messages", e))?;

        let messages = rows
            .into_iter()
            .map(ContactMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(messages, total, page))
    }

    async fn count_unread(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE NOT read")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count unread messages", e))?;
        Ok(count as u64)
    }

    async fn delete(&self, id: &ContactMessageId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete contact message", e))?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }
}
