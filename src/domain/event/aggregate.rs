//! Event aggregate.
//!
//! # Invariants
//!
//! - `ends_at >= starts_at`
//! - `rsvp_count <= capacity` when a capacity is set
//! - `checked_in_count <= rsvp_count`

use crate::domain::foundation::{
    optional_text, required_text, DomainError, ErrorCode, EventId, Timestamp, ValidationError,
};

use super::PricingTiers;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_LOCATION_LEN: usize = 300;
pub const MAX_IMAGE_URL_LEN: usize = 2048;
/// Largest capacity the attendance columns can hold.
pub const MAX_CAPACITY: u32 = i32::MAX as u32;

/// Club event with pricing and attendance counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub pricing: PricingTiers,
    pub capacity: Option<u32>,
    pub published: bool,
    pub image_url: Option<String>,
    pub rsvp_count: u32,
    pub checked_in_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Editable event fields, validated together.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub pricing: PricingTiers,
    pub capacity: Option<u32>,
    pub image_url: Option<String>,
}

impl EventDetails {
    #[allow(clippy::too_many_arguments)]
    pub fn parse(
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
        starts_at: Timestamp,
        ends_at: Timestamp,
        pricing: PricingTiers,
        capacity: Option<u32>,
        image_url: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if ends_at.is_before(&starts_at) {
            return Err(ValidationError::invalid_format(
                "ends_at",
                "must not be before starts_at",
            ));
        }
        if let Some(capacity) = capacity {
            if capacity == 0 || capacity > MAX_CAPACITY {
                return Err(ValidationError::out_of_range(
                    "capacity",
                    1,
                    i64::from(MAX_CAPACITY),
                    i64::from(capacity),
                ));
            }
        }
        Ok(Self {
            title: required_text("title", title, MAX_TITLE_LEN)?,
            description: optional_text("description", description, MAX_DESCRIPTION_LEN)?
                .unwrap_or_default(),
            location: optional_text("location", location, MAX_LOCATION_LEN)?.unwrap_or_default(),
            starts_at,
            ends_at,
            pricing,
            capacity,
            image_url: optional_text("image_url", image_url, MAX_IMAGE_URL_LEN)?,
        })
    }
}

impl Event {
    /// New events start unpublished with empty counters.
    pub fn create(id: EventId, details: EventDetails) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            title: details.title,
            description: details.description,
            location: details.location,
            starts_at: details.starts_at,
            ends_at: details.ends_at,
            pricing: details.pricing,
            capacity: details.capacity,
            published: false,
            image_url: details.image_url,
            rsvp_count: 0,
            checked_in_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields. Capacity may not drop below seats
    /// already reserved.
    pub fn update(&mut self, details: EventDetails) -> Result<(), ValidationError> {
        if let Some(capacity) = details.capacity {
            if capacity < self.rsvp_count {
                return Err(ValidationError::out_of_range(
                    "capacity",
                    i64::from(self.rsvp_count),
                    i64::from(MAX_CAPACITY),
                    i64::from(capacity),
                ));
            }
        }
        self.title = details.title;
        self.description = details.description;
        self.location = details.location;
        self.starts_at = details.starts_at;
        self.ends_at = details.ends_at;
        self.pricing = details.pricing;
        self.capacity = details.capacity;
        self.image_url = details.image_url;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn set_published(&mut self, published: bool) {
        self.published = published;
        self.updated_at = Timestamp::now();
    }

    pub fn has_started(&self, now: &Timestamp) -> bool {
        !self.starts_at.is_after(now)
    }

    /// Published and not yet started.
    pub fn ensure_accepting_rsvps(&self, now: &Timestamp) -> Result<(), DomainError> {
        if !self.published {
            return Err(DomainError::new(ErrorCode::EventNotFound, "Event not found"));
        }
        if self.has_started(now) {
            return Err(DomainError::new(
                ErrorCode::EventClosed,
                "This event is no longer accepting reservations",
            ));
        }
        Ok(())
    }

    /// Remaining seats, or `None` when capacity is unlimited.
    pub fn seats_available(&self) -> Option<u32> {
        self.capacity
            .map(|capacity| capacity.saturating_sub(self.rsvp_count))
    }

    /// Fails with `EventFull` when `seats` exceed what is left.
    pub fn ensure_seats(&self, seats: u32) -> Result<(), DomainError> {
        match self.seats_available() {
            Some(available) if seats > available => Err(DomainError::new(
                ErrorCode::EventFull,
                "Not enough seats left for this reservation",
            )
            .with_detail("seats_requested", seats.to_string())
            .with_detail("seats_available", available.to_string())),
            _ => Ok(()),
        }
    }

    pub fn reserve_seats(&mut self, seats: u32) -> Result<(), DomainError> {
        self.ensure_seats(seats)?;
        self.rsvp_count += seats;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Frees seats; `checked_in` also rolls back the check-in counter.
    pub fn release_seats(&mut self, seats: u32, checked_in: bool) {
        self.rsvp_count = self.rsvp_count.saturating_sub(seats);
        if checked_in {
            self.checked_in_count = self.checked_in_count.saturating_sub(seats);
        }
        self.checked_in_count = self.checked_in_count.min(self.rsvp_count);
        self.updated_at = Timestamp::now();
    }

    pub fn record_check_in(&mut self, seats: u32) {
        self.checked_in_count = (self.checked_in_count + seats).min(self.rsvp_count);
        self.updated_at = Timestamp::now();
    }

    /// Share of capacity reserved, as a fraction in `0.0..=1.0`.
    pub fn utilization(&self) -> Option<f64> {
        self.capacity
            .map(|capacity| f64::from(self.rsvp_count) / f64::from(capacity.max(1)))
    }
}
