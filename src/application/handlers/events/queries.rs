//! Event queries for the public calendar and the back office.

use std::sync::Arc;

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp};
use crate::ports::{EventRepository, Page, Paginated};

pub(crate) fn event_not_found(id: &EventId) -> DomainError {
    DomainError::new(ErrorCode::EventNotFound, "Event not found")
        .with_detail("event_id", id.to_string())
}

pub(crate) async fn load_event(
    events: &dyn EventRepository,
    id: &EventId,
) -> Result<Event, DomainError> {
    events.find_by_id(id).await?.ok_or_else(|| event_not_found(id))
}

/// Published events that have not ended, soonest first.
pub struct ListUpcomingEventsHandler {
    events: Arc<dyn EventRepository>,
}

impl ListUpcomingEventsHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self) -> Result<Vec<Event>, DomainError> {
        self.events.list_upcoming_published(Timestamp::now()).await
    }
}

/// Public single-event view. Drafts look exactly like missing events.
pub struct GetPublishedEventHandler {
    events: Arc<dyn EventRepository>,
}

impl GetPublishedEventHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, id: EventId) -> Result<Event, DomainError> {
        let event = load_event(self.events.as_ref(), &id).await?;
        if !event.published {
            return Err(event_not_found(&id));
        }
        Ok(event)
    }
}

pub struct ListEventsHandler {
    events: Arc<dyn EventRepository>,
}

impl ListEventsHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, page: Page) -> Result<Paginated<Event>, DomainError> {
        self.events.list_all(page).await
    }
}

pub struct GetEventHandler {
    events: Arc<dyn EventRepository>,
}

impl GetEventHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, id: EventId) -> Result<Event, DomainError> {
        load_event(self.events.as_ref(), &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::event::{EventDetails, PricingTiers};

    fn event(title: &str, starts_in_days: i64, published: bool) -> Event {
        let start = Timestamp::now().add_days(starts_in_days);
        let mut event = Event::create(
            EventId::new(),
            EventDetails::parse(
                title,
                None,
                None,
                start,
                start.add_days(1),
                PricingTiers::new(0, 0, "usd").unwrap(),
                None,
                None,
            )
            .unwrap(),
        );
        event.set_published(published);
        event
    }

    #[tokio::test]
    async fn public_views_hide_drafts_and_past_events() {
        let store = InMemoryStore::new();
        let upcoming = event("Picnic", 5, true);
        let draft = event("Secret", 5, false);
        let past = event("Last year", -30, true);
        for e in [&upcoming, &draft, &past] {
            EventRepository::save(&store, e).await.unwrap();
        }

        let listed = ListUpcomingEventsHandler::new(Arc::new(store.clone()))
            .handle()
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, upcoming.id);

        let public = GetPublishedEventHandler::new(Arc::new(store.clone()));
        assert!(public.handle(upcoming.id).await.is_ok());
        assert_eq!(public.handle(draft.id).await.unwrap_err().code, ErrorCode::EventNotFound);

        let admin = ListEventsHandler::new(Arc::new(store.clone()))
            .handle(Page::default())
            .await
            .unwrap();
        assert_eq!(admin.total, 3);
        assert!(GetEventHandler::new(Arc::new(store)).handle(draft.id).await.is_ok());
    }
}
