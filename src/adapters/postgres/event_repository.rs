//! PostgreSQL implementation of EventRepository.
//!
//! Seat counters live on the `events` row. Every operation that moves them
//! locks that row with `SELECT ... FOR UPDATE` and applies the change through
//! the `Event` aggregate inside one transaction, so concurrent reservations
//! can never oversell capacity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::event::{Event, PricingTiers, Rsvp, RsvpStatus};
use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, MemberId, PaymentId, RsvpId, Timestamp,
};
use crate::ports::{EventRepository, Page, Paginated};

use super::{corrupt, db_error, to_i32, to_u32, violates};

pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    member_price_cents: i64,
    guest_price_cents: i64,
    currency: String,
    capacity: Option<i32>,
    published: bool,
    image_url: Option<String>,
    rsvp_count: i32,
    checked_in_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            location: row.location,
            starts_at: Timestamp::from_datetime(row.starts_at),
            ends_at: Timestamp::from_datetime(row.ends_at),
            pricing: PricingTiers {
                member_price_cents: row.member_price_cents,
                guest_price_cents: row.guest_price_cents,
                currency: row.currency,
            },
            capacity: row.capacity.map(|c| to_u32("capacity", c)).transpose()?,
            published: row.published,
            image_url: row.image_url,
            rsvp_count: to_u32("rsvp_count", row.rsvp_count)?,
            checked_in_count: to_u32("checked_in_count", row.checked_in_count)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RsvpRow {
    id: Uuid,
    event_id: Uuid,
    member_id: Uuid,
    guests: i32,
    status: String,
    checked_in: bool,
    payment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = DomainError;

    fn try_from(row: RsvpRow) -> Result<Self, Self::Error> {
        Ok(Rsvp {
            id: RsvpId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            member_id: MemberId::from_uuid(row.member_id),
            guests: to_u32("guests", row.guests)?,
            status: row
                .status
                .parse::<RsvpStatus>()
                .map_err(|_| corrupt("status", &row.status))?,
            checked_in: row.checked_in,
            payment_id: row.payment_id.map(PaymentId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

const SELECT_EVENT: &str = r#"
    SELECT id, title, description, location, starts_at, ends_at,
           member_price_cents, guest_price_cents, currency, capacity, published,
           image_url, rsvp_count, checked_in_count, created_at, updated_at
    FROM events
"#;

const SELECT_RSVP: &str = r#"
    SELECT id, event_id, member_id, guests, status, checked_in, payment_id, created_at
    FROM rsvps
"#;

fn event_not_found() -> DomainError {
    DomainError::new(ErrorCode::EventNotFound, "Event not found")
}

fn rsvp_not_found() -> DomainError {
    DomainError::new(ErrorCode::RsvpNotFound, "Reservation not found")
}

fn already_rsvped() -> DomainError {
    DomainError::new(
        ErrorCode::AlreadyRsvped,
        "You already have a reservation for this event",
    )
}

async fn lock_event(
    tx: &mut Transaction<'_, Postgres>,
    id: &EventId,
) -> Result<Event, DomainError> {
    let row: Option<EventRow> =
        sqlx::query_as(&format!("{} WHERE id = $1 FOR UPDATE", SELECT_EVENT))
            .bind(id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to lock event", e))?;
    row.map(Event::try_from).transpose()?.ok_or_else(event_not_found)
}

async fn lock_rsvp(tx: &mut Transaction<'_, Postgres>, id: &RsvpId) -> Result<Rsvp, DomainError> {
    let row: Option<RsvpRow> = sqlx::query_as(&format!("{} WHERE id = $1 FOR UPDATE", SELECT_RSVP))
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to lock reservation", e))?;
    row.map(Rsvp::try_from).transpose()?.ok_or_else(rsvp_not_found)
}

async fn write_counters(
    tx: &mut Transaction<'_, Postgres>,
    event: &Event,
) -> Result<(), DomainError> {
    sqlx::query(
        "UPDATE events SET rsvp_count = $2, checked_in_count = $3, updated_at = $4 WHERE id = $1",
    )
    .bind(event.id.as_uuid())
    .bind(to_i32("rsvp_count", event.rsvp_count)?)
    .bind(to_i32("checked_in_count", event.checked_in_count)?)
    .bind(event.updated_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to update event counters", e))?;
    Ok(())
}

impl PostgresEventRepository {
    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))
    }

    async fn fetch_rsvps(&self, sql: String, id: &Uuid) -> Result<Vec<Rsvp>, DomainError> {
        let rows: Vec<RsvpRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list reservations", e))?;
        rows.into_iter().map(Rsvp::try_from).collect()
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), DomainError> {
    tx.commit()
        .await
        .map_err(|e| db_error("Failed to commit transaction", e))
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, description, location, starts_at, ends_at,
                member_price_cents, guest_price_cents, currency, capacity, published,
                image_url, rsvp_count, checked_in_count, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at.as_datetime())
        .bind(event.ends_at.as_datetime())
        .bind(event.pricing.member_price_cents)
        .bind(event.pricing.guest_price_cents)
        .bind(&event.pricing.currency)
        .bind(event.capacity.map(|c| to_i32("capacity", c)).transpose()?)
        .bind(event.published)
        .bind(&event.image_url)
        .bind(to_i32("rsvp_count", event.rsvp_count)?)
        .bind(to_i32("checked_in_count", event.checked_in_count)?)
        .bind(event.created_at.as_datetime())
        .bind(event.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save event", e))?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), DomainError> {
        // Counters are owned by reserve/cancel/check-in.
        let result = sqlx::query(
            r#"
            UPDATE events SET
                title = $2,
                description = $3,
                location = $4,
                starts_at = $5,
                ends_at = $6,
                member_price_cents = $7,
                guest_price_cents = $8,
                currency = $9,
                capacity = $10,
                published = $11,
                image_url = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at.as_datetime())
        .bind(event.ends_at.as_datetime())
        .bind(event.pricing.member_price_cents)
        .bind(event.pricing.guest_price_cents)
        .bind(&event.pricing.currency)
        .bind(event.capacity.map(|c| to_i32("capacity", c)).transpose()?)
        .bind(event.published)
        .bind(&event.image_url)
        .bind(event.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "events_capacity_respected") {
                return DomainError::validation(
                    "capacity",
                    "Capacity cannot be lower than the seats already reserved",
                );
            }
            db_error("Failed to update event", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(event_not_found());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        let row: Option<EventRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_EVENT))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch event", e))?;
        row.map(Event::try_from).transpose()
    }

    async fn list_all(&self, page: Page) -> Result<Paginated<Event>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count events", e))?;

        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "{} ORDER BY starts_at DESC LIMIT $1 OFFSET $2",
            SELECT_EVENT
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list events", e))?;

        let events = rows
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(events, total, page))
    }

    async fn list_upcoming_published(&self, now: Timestamp) -> Result<Vec<Event>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "{} WHERE published AND ends_at > $1 ORDER BY starts_at ASC",
            SELECT_EVENT
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list upcoming events", e))?;
        rows.into_iter().map(Event::try_from).collect()
    }

    async fn delete(&self, id: &EventId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete event", e))?;
        if result.rows_affected() == 0 {
            return Err(event_not_found());
        }
        Ok(())
    }

    async fn reserve(&self, rsvp: &Rsvp) -> Result<Event, DomainError> {
        let mut tx = self.begin().await?;
        let mut event = lock_event(&mut tx, &rsvp.event_id).await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM rsvps WHERE event_id = $1 AND member_id = $2 AND status = 'confirmed'",
        )
        .bind(rsvp.event_id.as_uuid())
        .bind(rsvp.member_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to check reservations", e))?;
        if existing.is_some() {
            return Err(already_rsvped());
        }

        event.reserve_seats(rsvp.seats())?;

        sqlx::query(
            r#"
            INSERT INTO rsvps (id, event_id, member_id, guests, status, checked_in, payment_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(rsvp.id.as_uuid())
        .bind(rsvp.event_id.as_uuid())
        .bind(rsvp.member_id.as_uuid())
        .bind(rsvp.guests as i32)
        .bind(rsvp.status.as_str())
        .bind(rsvp.checked_in)
        .bind(rsvp.payment_id.map(|id| *id.as_uuid()))
        .bind(rsvp.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "rsvps_one_confirmed_per_member") {
                return already_rsvped();
            }
            db_error("Failed to save reservation", e)
        })?;

        write_counters(&mut tx, &event).await?;
        commit(tx).await?;

        tracing::debug!(event_id = %event.id, rsvp_id = %rsvp.id, seats = rsvp.seats(), "Seats reserved");
        Ok(event)
    }

    async fn cancel_rsvp(&self, id: &RsvpId) -> Result<Event, DomainError> {
        let mut tx = self.begin().await?;
        let mut rsvp = lock_rsvp(&mut tx, id).await?;
        let mut event = lock_event(&mut tx, &rsvp.event_id).await?;

        let was_checked_in = rsvp.checked_in;
        rsvp.cancel()?;
        event.release_seats(rsvp.seats(), was_checked_in);

        sqlx::query("UPDATE rsvps SET status = $2 WHERE id = $1")
            .bind(rsvp.id.as_uuid())
            .bind(rsvp.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to cancel reservation", e))?;
        write_counters(&mut tx, &event).await?;
        commit(tx).await?;
        Ok(event)
    }

    async fn check_in(&self, id: &RsvpId) -> Result<(Rsvp, Event), DomainError> {
        let mut tx = self.begin().await?;
        let mut rsvp = lock_rsvp(&mut tx, id).await?;
        let mut event = lock_event(&mut tx, &rsvp.event_id).await?;

        rsvp.check_in()?;
        event.record_check_in(rsvp.seats());

        sqlx::query("UPDATE rsvps SET checked_in = TRUE WHERE id = $1")
            .bind(rsvp.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to check in reservation", e))?;
        write_counters(&mut tx, &event).await?;
        commit(tx).await?;
        Ok((rsvp, event))
    }

    async fn find_rsvp(&self, id: &RsvpId) -> Result<Option<Rsvp>, DomainError> {
        let row: Option<RsvpRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_RSVP))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch reservation", e))?;
        row.map(Rsvp::try_from).transpose()
    }

    async fn find_confirmed_rsvp(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<Option<Rsvp>, DomainError> {
        let row: Option<RsvpRow> = sqlx::query_as(&format!(
            "{} WHERE event_id = $1 AND member_id = $2 AND status = 'confirmed'",
            SELECT_RSVP
        ))
        .bind(event_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch reservation", e))?;
        row.map(Rsvp::try_from).transpose()
    }

    async fn list_rsvps_for_event(&self, event_id: &EventId) -> Result<Vec<Rsvp>, DomainError> {
        self.fetch_rsvps(
            format!("{} WHERE event_id = $1 ORDER BY created_at ASC", SELECT_RSVP),
            event_id.as_uuid(),
        )
        .await
    }

    async fn list_rsvps_for_member(&self, member_id: &MemberId) -> Result<Vec<Rsvp>, DomainError> {
        self.fetch_rsvps(
            format!("{} WHERE member_id = $1 ORDER BY created_at DESC", SELECT_RSVP),
            member_id.as_uuid(),
        )
        .await
    }

    async fn remove_member_rsvps(&self, member_id: &MemberId) -> Result<u64, DomainError> {
        let mut tx = self.begin().await?;

        let rows: Vec<RsvpRow> = sqlx::query_as(&format!(
            "{} WHERE member_id = $1 FOR UPDATE",
            SELECT_RSVP
        ))
        .bind(member_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to load member reservations", e))?;
        let owned = rows
            .into_iter()
            .map(Rsvp::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for rsvp in owned.iter().filter(|r| r.is_confirmed()) {
            let mut event = match lock_event(&mut tx, &rsvp.event_id).await {
                Ok(event) => event,
                Err(e) if e.code == ErrorCode::EventNotFound => continue,
                Err(e) => return Err(e),
            };
            event.release_seats(rsvp.seats(), rsvp.checked_in);
            write_counters(&mut tx, &event).await?;
        }

        let result = sqlx::query("DELETE FROM rsvps WHERE member_id = $1")
            .bind(member_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete member reservations", e))?;
        commit(tx).await?;
        Ok(result.rows_affected())
    }
}
