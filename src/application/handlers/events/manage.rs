//! Back-office event management (editor and above).

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::event::{Event, EventDetails, PricingTiers, Rsvp};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, RsvpId, Timestamp};
use crate::ports::{EventRepository, MemberRepository};

use super::queries::load_event;

/// Editable event fields as submitted by the back office.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    #[serde(default)]
    pub member_price_cents: i64,
    #[serde(default)]
    pub guest_price_cents: i64,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EventInput {
    fn into_details(self, currency: &str) -> Result<EventDetails, DomainError> {
        let pricing = PricingTiers::new(self.member_price_cents, self.guest_price_cents, currency)?;
        Ok(EventDetails::parse(
            &self.title,
            self.description.as_deref(),
            self.location.as_deref(),
            self.starts_at,
            self.ends_at,
            pricing,
            self.capacity,
            self.image_url.as_deref(),
        )?)
    }
}

pub struct CreateEventHandler {
    events: Arc<dyn EventRepository>,
    currency: String,
}

impl CreateEventHandler {
    pub fn new(events: Arc<dyn EventRepository>, currency: impl Into<String>) -> Self {
        Self {
            events,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self, input: EventInput) -> Result<Event, DomainError> {
        let event = Event::create(EventId::new(), input.into_details(&self.currency)?);
        self.events.save(&event).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "Event created");
        Ok(event)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateEventCommand {
    pub event_id: EventId,
    pub input: EventInput,
}

pub struct UpdateEventHandler {
    events: Arc<dyn EventRepository>,
    currency: String,
}

impl UpdateEventHandler {
    pub fn new(events: Arc<dyn EventRepository>, currency: impl Into<String>) -> Self {
        Self {
            events,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self, cmd: UpdateEventCommand) -> Result<Event, DomainError> {
        let mut event = load_event(self.events.as_ref(), &cmd.event_id).await?;
        event.update(cmd.input.into_details(&self.currency)?)?;
        self.events.update(&event).await?;
        tracing::info!(event_id = %event.id, "Event updated");
        Ok(event)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetEventPublishedCommand {
    pub event_id: EventId,
    pub published: bool,
}

pub struct SetEventPublishedHandler {
    events: Arc<dyn EventRepository>,
}

impl SetEventPublishedHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, cmd: SetEventPublishedCommand) -> Result<Event, DomainError> {
        let mut event = load_event(self.events.as_ref(), &cmd.event_id).await?;
        event.set_published(cmd.published);
        self.events.update(&event).await?;
        tracing::info!(event_id = %event.id, published = cmd.published, "Event visibility changed");
        Ok(event)
    }
}

/// Deletes an event. Events with confirmed reservations must be unpublished
/// instead.
pub struct DeleteEventHandler {
    events: Arc<dyn EventRepository>,
}

impl DeleteEventHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, event_id: EventId) -> Result<(), DomainError> {
        let event = load_event(self.events.as_ref(), &event_id).await?;
        let confirmed = self
            .events
            .list_rsvps_for_event(&event.id)
            .await?
            .iter()
            .filter(|r| r.is_confirmed())
            .count();
        if confirmed > 0 {
            return Err(DomainError::new(
                ErrorCode::EventHasRsvps,
                "Event has confirmed reservations; unpublish it instead",
            )
            .with_detail("confirmed_rsvps", confirmed.to_string()));
        }

        self.events.delete(&event.id).await?;
        tracing::info!(event_id = %event.id, "Event deleted");
        Ok(())
    }
}

/// One line of the attendee list.
#[derive(Debug, Clone)]
pub struct EventAttendee {
    pub rsvp: Rsvp,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
}

pub struct ListEventRsvpsHandler {
    events: Arc<dyn EventRepository>,
    members: Arc<dyn MemberRepository>,
}

impl ListEventRsvpsHandler {
    pub fn new(events: Arc<dyn EventRepository>, members: Arc<dyn MemberRepository>) -> Self {
        Self { events, members }
    }

    pub async fn handle(&self, event_id: EventId) -> Result<Vec<EventAttendee>, DomainError> {
        let event = load_event(self.events.as_ref(), &event_id).await?;
        let rsvps = self.events.list_rsvps_for_event(&event.id).await?;

        let mut attendees = Vec::with_capacity(rsvps.len());
        for rsvp in rsvps {
            let member = self.members.find_by_id(&rsvp.member_id).await?;
            attendees.push(EventAttendee {
                member_name: member.as_ref().map(|m| m.full_name()),
                member_email: member.map(|m| m.email.as_str().to_string()),
                rsvp,
            });
        }
        Ok(attendees)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckInCommand {
    pub event_id: EventId,
    pub rsvp_id: RsvpId,
}

#[derive(Debug, Clone)]
pub struct CheckInResult {
    pub rsvp: Rsvp,
    pub event: Event,
}

pub struct CheckInHandler {
    events: Arc<dyn EventRepository>,
}

impl CheckInHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, cmd: CheckInCommand) -> Result<CheckInResult, DomainError> {
        let rsvp = self
            .events
            .find_rsvp(&cmd.rsvp_id)
            .await?
            .filter(|r| r.event_id == cmd.event_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::RsvpNotFound, "Reservation not found")
                    .with_detail("rsvp_id", cmd.rsvp_id.to_string())
            })?;

        let (rsvp, event) = self.events.check_in(&rsvp.id).await?;
        tracing::info!(
            event_id = %event.id,
            rsvp_id = %rsvp.id,
            checked_in_count = event.checked_in_count,
            "Attendee checked in"
        );
        Ok(CheckInResult { rsvp, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::test_support;
    use crate::domain::foundation::MemberId;

    fn input(title: &str) -> EventInput {
        let starts_at = Timestamp::now().add_days(14);
        EventInput {
            title: title.into(),
            description: Some("Bring a friend".into()),
            location: None,
            starts_at,
            ends_at: starts_at.add_days(1),
            member_price_cents: 0,
            guest_price_cents: 0,
            capacity: Some(20),
            image_url: None,
        }
    }

    async fn created(store: &InMemoryStore) -> Event {
        CreateEventHandler::new(Arc::new(store.clone()), "usd")
            .handle(input("Garden party"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn created_events_start_as_drafts() {
        let store = InMemoryStore::new();
        let event = created(&store).await;
        assert!(!event.published);

        let published = SetEventPublishedHandler::new(Arc::new(store))
            .handle(SetEventPublishedCommand {
                event_id: event.id,
                published: true,
            })
            .await
            .unwrap();
        assert!(published.published);
    }

    #[tokio::test]
    async fn create_rejects_end_before_start() {
        let store = InMemoryStore::new();
        let mut bad = input("Backwards");
        bad.ends_at = bad.starts_at.add_days(-1);
        let err = CreateEventHandler::new(Arc::new(store), "usd")
            .handle(bad)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn update_cannot_shrink_capacity_below_reservations() {
        let store = InMemoryStore::new();
        let event = created(&store).await;
        store
            .reserve(&Rsvp::confirm(RsvpId::new(), event.id, MemberId::new(), 4, None).unwrap())
            .await
            .unwrap();

        let mut smaller = input("Garden party");
        smaller.capacity = Some(3);
        let err = UpdateEventHandler::new(Arc::new(store), "usd")
            .handle(UpdateEventCommand {
                event_id: event.id,
                input: smaller,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn delete_refuses_events_with_confirmed_rsvps() {
        let store = InMemoryStore::new();
        let event = created(&store).await;
        let rsvp = Rsvp::confirm(RsvpId::new(), event.id, MemberId::new(), 0, None).unwrap();
        store.reserve(&rsvp).await.unwrap();
        let handler = DeleteEventHandler::new(Arc::new(store.clone()));

        let err = handler.handle(event.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EventHasRsvps);

        store.cancel_rsvp(&rsvp.id).await.unwrap();
        handler.handle(event.id).await.unwrap();
        assert!(EventRepository::find_by_id(&store, &event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn attendee_list_and_check_in() {
        let store = InMemoryStore::new();
        let event = created(&store).await;
        let member = test_support::active_member(&store, "grace@example.org").await;
        let rsvp = Rsvp::confirm(RsvpId::new(), event.id, member.id, 1, None).unwrap();
        store.reserve(&rsvp).await.unwrap();

        let attendees = ListEventRsvpsHandler::new(Arc::new(store.clone()), Arc::new(store.clone()))
            .handle(event.id)
            .await
            .unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0].member_email.as_deref(), Some("grace@example.org"));

        let handler = CheckInHandler::new(Arc::new(store.clone()));
        let result = handler
            .handle(CheckInCommand {
                event_id: event.id,
                rsvp_id: rsvp.id,
            })
            .await
            .unwrap();
        assert!(result.rsvp.checked_in);
        assert_eq!(result.event.checked_in_count, 2);

        let again = handler
            .handle(CheckInCommand {
                event_id: event.id,
                rsvp_id: rsvp.id,
            })
            .await
            .unwrap_err();
        assert_eq!(again.code, ErrorCode::InvalidStateTransition);

        let wrong_event = handler
            .handle(CheckInCommand {
                event_id: EventId::new(),
                rsvp_id: rsvp.id,
            })
            .await
            .unwrap_err();
        assert_eq!(wrong_event.code, ErrorCode::RsvpNotFound);
    }
}
