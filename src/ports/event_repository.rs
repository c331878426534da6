//! Event and RSVP repository port.
//!
//! Seat accounting is done by the repository so the capacity check and the
//! counter update happen atomically (row lock in Postgres, one mutex in
//! memory).

use async_trait::async_trait;

use crate::domain::event::{Event, Rsvp};
use crate::domain::foundation::{DomainError, EventId, MemberId, RsvpId, Timestamp};

use super::{Page, Paginated};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn save(&self, event: &Event) -> Result<(), DomainError>;

    /// Updates editable fields and the published flag. Counters are only
    /// changed through the RSVP operations below.
    async fn update(&self, event: &Event) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError>;

    /// All events for the back office, newest start first.
    async fn list_all(&self, page: Page) -> Result<Paginated<Event>, DomainError>;

    /// Published events starting at or after `now`, soonest first.
    async fn list_upcoming_published(&self, now: Timestamp) -> Result<Vec<Event>, DomainError>;

    async fn delete(&self, id: &EventId) -> Result<(), DomainError>;

    /// Inserts a confirmed RSVP and adds its seats to the event.
    ///
    /// # Errors
    ///
    /// - `EventNotFound` if the event does not exist
    /// - `AlreadyRsvped` if the member holds a confirmed RSVP for the event
    /// - `EventFull` if the seats exceed the remaining capacity
    async fn reserve(&self, rsvp: &Rsvp) -> Result<Event, DomainError>;

    /// Cancels an RSVP and frees its seats.
    ///
    /// # Errors
    ///
    /// - `RsvpNotFound`, or `InvalidStateTransition` if already cancelled
    async fn cancel_rsvp(&self, id: &RsvpId) -> Result<Event, DomainError>;

    /// Marks an RSVP checked in and bumps the event counter.
    async fn check_in(&self, id: &RsvpId) -> Result<(Rsvp, Event), DomainError>;

    async fn find_rsvp(&self, id: &RsvpId) -> Result<Option<Rsvp>, DomainError>;

    async fn find_confirmed_rsvp(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<Option<Rsvp>, DomainError>;

    async fn list_rsvps_for_event(&self, event_id: &EventId) -> Result<Vec<Rsvp>, DomainError>;

    async fn list_rsvps_for_member(&self, member_id: &MemberId) -> Result<Vec<Rsvp>, DomainError>;

    /// Removes every RSVP of a deleted member, freeing confirmed seats.
    async fn remove_member_rsvps(&self, member_id: &MemberId) -> Result<u64, DomainError>;
}
