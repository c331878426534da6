use async_trait::async_trait;

use crate::domain::event::{Event, Rsvp};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, MemberId, RsvpId, Timestamp};
use crate::ports::{EventRepository, Page, Paginated};

use super::InMemoryStore;

fn event_not_found() -> DomainError {
    DomainError::new(ErrorCode::EventNotFound, "Event not found")
}

fn rsvp_not_found() -> DomainError {
    DomainError::new(ErrorCode::RsvpNotFound, "Reservation not found")
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        self.tables.write().await.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables.events.get_mut(&event.id).ok_or_else(event_not_found)?;
        // Counters are owned by reserve/cancel/check-in.
        let (rsvp_count, checked_in_count) = (stored.rsvp_count, stored.checked_in_count);
        *stored = event.clone();
        stored.rsvp_count = rsvp_count;
        stored.checked_in_count = checked_in_count;
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        Ok(self.tables.read().await.events.get(id).cloned())
    }

    async fn list_all(&self, page: Page) -> Result<Paginated<Event>, DomainError> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables.events.values().cloned().collect();
        events.sort_by(|a, b| b.starts_at.cmp(&a.starts_at));
        let total = events.len() as i64;
        Ok(Paginated::new(page.slice(&events), total, page))
    }

    async fn list_upcoming_published(&self, now: Timestamp) -> Result<Vec<Event>, DomainError> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.published && e.ends_at.is_after(&now))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(events)
    }

    async fn delete(&self, id: &EventId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables.events.remove(id).ok_or_else(event_not_found)?;
        tables.rsvps.retain(|_, r| &r.event_id != id);
        Ok(())
    }

    async fn reserve(&self, rsvp: &Rsvp) -> Result<Event, DomainError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.rsvps.values().any(|r| {
            r.event_id == rsvp.event_id && r.member_id == rsvp.member_id && r.is_confirmed()
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::AlreadyRsvped,
                "You already have a reservation for this event",
            ));
        }

        let event = tables
            .events
            .get_mut(&rsvp.event_id)
            .ok_or_else(event_not_found)?;
        event.reserve_seats(rsvp.seats())?;
        let updated = event.clone();
        tables.rsvps.insert(rsvp.id, rsvp.clone());
        Ok(updated)
    }

    async fn cancel_rsvp(&self, id: &RsvpId) -> Result<Event, DomainError> {
        let mut tables = self.tables.write().await;
        let rsvp = tables.rsvps.get_mut(id).ok_or_else(rsvp_not_found)?;
        let was_checked_in = rsvp.checked_in;
        rsvp.cancel()?;
        let (event_id, seats) = (rsvp.event_id, rsvp.seats());

        let event = tables.events.get_mut(&event_id).ok_or_else(event_not_found)?;
        event.release_seats(seats, was_checked_in);
        Ok(event.clone())
    }

    async fn check_in(&self, id: &RsvpId) -> Result<(Rsvp, Event), DomainError> {
        let mut tables = self.tables.write().await;
        let rsvp = tables.rsvps.get_mut(id).ok_or_else(rsvp_not_found)?;
        rsvp.check_in()?;
        let checked = rsvp.clone();

        let event = tables
            .events
            .get_mut(&checked.event_id)
            .ok_or_else(event_not_found)?;
        event.record_check_in(checked.seats());
        Ok((checked, event.clone()))
    }

    async fn find_rsvp(&self, id: &RsvpId) -> Result<Option<Rsvp>, DomainError> {
        Ok(self.tables.read().await.rsvps.get(id).cloned())
    }

    async fn find_confirmed_rsvp(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<Option<Rsvp>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .rsvps
            .values()
            .find(|r| &r.event_id == event_id && &r.member_id == member_id && r.is_confirmed())
            .cloned())
    }

    async fn list_rsvps_for_event(&self, event_id: &EventId) -> Result<Vec<Rsvp>, DomainError> {
        let tables = self.tables.read().await;
        let mut rsvps: Vec<Rsvp> = tables
            .rsvps
            .values()
            .filter(|r| &r.event_id == event_id)
            .cloned()
            .collect();
        rsvps.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rsvps)
    }

    async fn list_rsvps_for_member(&self, member_id: &MemberId) -> Result<Vec<Rsvp>, DomainError> {
        let tables = self.tables.read().await;
        let mut rsvps: Vec<Rsvp> = tables
            .rsvps
            .values()
            .filter(|r| &r.member_id == member_id)
            .cloned()
            .collect();
        rsvps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rsvps)
    }

    async fn remove_member_rsvps(&self, member_id: &MemberId) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().await;
        let owned: Vec<Rsvp> = tables
            .rsvps
            .values()
            .filter(|r| &r.member_id == member_id)
            .cloned()
            .collect();

        for rsvp in owned.iter().filter(|r| r.is_confirmed()) {
            if let Some(event) = tables.events.get_mut(&rsvp.event_id) {
                event.release_seats(rsvp.seats(), rsvp.checked_in);
            }
        }
        for rsvp in &owned {
            tables.rsvps.remove(&rsvp.id);
        }
        Ok(owned.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{EventDetails, PricingTiers};

    fn event(capacity: Option<u32>) -> Event {
        let starts = Timestamp::now().add_days(7);
        let details = EventDetails::parse(
            "Quiz Night",
            None,
            Some("Club room"),
            starts,
            starts.add_days(1),
            PricingTiers::new(0, 0, "usd").unwrap(),
            capacity,
            None,
        )
        .unwrap();
        let mut event = Event::create(EventId::new(), details);
        event.set_published(true);
        event
    }

    fn rsvp(event: &Event, member: MemberId, guests: u32) -> Rsvp {
        Rsvp::confirm(RsvpId::new(), event.id, member, guests, None).unwrap()
    }

    #[tokio::test]
    async fn reserve_counts_seats_and_blocks_duplicates() {
        let store = InMemoryStore::new();
        let event = event(Some(10));
        EventRepository::save(&store, &event).await.unwrap();
        let member = MemberId::new();

        let updated = store.reserve(&rsvp(&event, member, 2)).await.unwrap();
        assert_eq!(updated.rsvp_count, 3);

        let err = store.reserve(&rsvp(&event, member, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyRsvped);
    }

    #[tokio::test]
    async fn reserve_never_exceeds_capacity() {
        let store = InMemoryStore::new();
        let event = event(Some(3));
        EventRepository::save(&store, &event).await.unwrap();

        store.reserve(&rsvp(&event, MemberId::new(), 1)).await.unwrap();
        let err = store
            .reserve(&rsvp(&event, MemberId::new(), 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EventFull);

        let stored = EventRepository::find_by_id(&store, &event.id).await.unwrap().unwrap();
        assert_eq!(stored.rsvp_count, 2);
    }

    #[tokio::test]
    async fn cancel_after_check_in_rolls_back_both_counters() {
        let store = InMemoryStore::new();
        let event = event(None);
        EventRepository::save(&store, &event).await.unwrap();
        let booking = rsvp(&event, MemberId::new(), 1);
        store.reserve(&booking).await.unwrap();

        let (checked, after_check_in) = store.check_in(&booking.id).await.unwrap();
        assert!(checked.checked_in);
        assert_eq!(after_check_in.checked_in_count, 2);

        let after_cancel = store.cancel_rsvp(&booking.id).await.unwrap();
        assert_eq!(after_cancel.rsvp_count, 0);
        assert_eq!(after_cancel.checked_in_count, 0);
    }

    #[tokio::test]
    async fn update_preserves_counters() {
        let store = InMemoryStore::new();
        let event = event(None);
        EventRepository::save(&store, &event).await.unwrap();
        store.reserve(&rsvp(&event, MemberId::new(), 0)).await.unwrap();

        let mut stale = event.clone();
        stale.set_published(false);
        EventRepository::update(&store, &stale).await.unwrap();

        let stored = EventRepository::find_by_id(&store, &event.id).await.unwrap().unwrap();
        assert!(!stored.published);
        assert_eq!(stored.rsvp_count, 1);
    }

    #[tokio::test]
    async fn removing_member_rsvps_frees_seats() {
        let store = InMemoryStore::new();
        let event = event(Some(5));
        EventRepository::save(&store, &event).await.unwrap();
        let member = MemberId::new();
        store.reserve(&rsvp(&event, member, 3)).await.unwrap();

        assert_eq!(store.remove_member_rsvps(&member).await.unwrap(), 1);
        let stored = EventRepository::find_by_id(&store, &event.id).await.unwrap().unwrap();
        assert_eq!(stored.rsvp_count, 0);
        assert!(store.list_rsvps_for_member(&member).await.unwrap().is_empty());
    }
}
