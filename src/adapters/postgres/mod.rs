//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresMemberRepository`, `PostgresAdminUserRepository`
//! - `PostgresEventRepository` - events plus RSVPs; seat counters change
//!   inside row-locked transactions
//! - `PostgresGalleryRepository`, `PostgresPaymentRepository`
//! - `PostgresReferralSourceRepository`, `PostgresContactMessageRepository`
//! - `PostgresMarketingReader` - read model for statistics

mod admin_user_repository;
mod contact_message_repository;
mod event_repository;
mod gallery_repository;
mod marketing_reader;
mod member_repository;
mod payment_repository;
mod referral_source_repository;

pub use admin_user_repository::PostgresAdminUserRepository;
pub use contact_message_repository::PostgresContactMessageRepository;
pub use event_repository::PostgresEventRepository;
pub use gallery_repository::PostgresGalleryRepository;
pub use marketing_reader::PostgresMarketingReader;
pub use member_repository::PostgresMemberRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use referral_source_repository::PostgresReferralSourceRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Opens the pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let settings = &config.pool;
    let pool = PgPoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .idle_timeout(settings.idle_timeout())
        .max_lifetime(settings.max_lifetime())
        .connect(config.url.trim())
        .await?;
    tracing::info!(max_connections = settings.max_connections, "Database pool created");
    Ok(pool)
}

/// Applies the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, context, "Database query failed");
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// True when `e` violates the named unique constraint or index.
pub(crate) fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// Maps an unreadable stored value to a database error.
pub(crate) fn corrupt(column: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value in database: {}", column, value),
    )
}

pub(crate) fn to_u32(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| corrupt(column, value))
}

/// Narrows a count for an `INTEGER` column.
pub(crate) fn to_i32(column: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        ValidationError::out_of_range(column, 0, i64::from(i32::MAX), i64::from(value)).into()
    })
}
