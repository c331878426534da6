use async_trait::async_trait;

use crate::domain::content::ContactMessage;
use crate::domain::foundation::{ContactMessageId, DomainError, ErrorCode, ReferralSourceId};
use crate::domain::marketing::ReferralSource;
use crate::ports::{ContactMessageRepository, Page, Paginated, ReferralSourceRepository};

use super::InMemoryStore;

fn source_not_found() -> DomainError {
    DomainError::new(ErrorCode::ReferralSourceNotFound, "Referral source not found")
}

fn message_not_found() -> DomainError {
    DomainError::new(ErrorCode::ContactMessageNotFound, "Message not found")
}

#[async_trait]
impl ReferralSourceRepository for InMemoryStore {
    async fn save(&self, source: &ReferralSource) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let key = source.name_key();
        if tables.referral_sources.values().any(|s| s.name_key() == key) {
            return Err(DomainError::new(
                ErrorCode::ReferralSourceExists,
                "A referral source with this name already exists",
            ));
        }
        tables.referral_sources.insert(source.id, source.clone());
        Ok(())
    }

    async fn update(&self, source: &ReferralSource) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let key = source.name_key();
        if tables
            .referral_sources
            .values()
            .any(|s| s.id != source.id && s.name_key() == key)
        {
            return Err(DomainError::new(
                ErrorCode::ReferralSourceExists,
                "A referral source with this name already exists",
            ));
        }
        let stored = tables
            .referral_sources
            .get_mut(&source.id)
            .ok_or_else(source_not_found)?;
        *stored = source.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ReferralSourceId,
    ) -> Result<Option<ReferralSource>, DomainError> {
        Ok(self.tables.read().await.referral_sources.get(id).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<ReferralSource>, DomainError> {
        let tables = self.tables.read().await;
        let mut sources: Vec<ReferralSource> = tables
            .referral_sources
            .values()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect();
        sources.sort_by_key(|s| s.name_key());
        Ok(sources)
    }

    async fn usage_count(&self, id: &ReferralSourceId) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .values()
            .filter(|m| m.referral_source_id.as_ref() == Some(id))
            .count() as u64)
    }

    async fn delete(&self, id: &ReferralSourceId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables
            .referral_sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(source_not_found)
    }
}

#[async_trait]
impl ContactMessageRepository for InMemoryStore {
    async fn save(&self, message: &ContactMessage) -> Result<(), DomainError> {
        self.tables
            .write()
            .await
            .contact_messages
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn update(&self, message: &ContactMessage) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .contact_messages
            .get_mut(&message.id)
            .ok_or_else(message_not_found)?;
        *stored = message.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ContactMessageId,
    ) -> Result<Option<ContactMessage>, DomainError> {
        Ok(self.tables.read().await.contact_messages.get(id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Paginated<ContactMessage>, DomainError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<ContactMessage> =
            tables.contact_messages.values().cloned().collect();
        messages.sort_by(|a, b| {
            a.read
                .cmp(&b.read)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        let total = messages.len() as i64;
        Ok(Paginated::new(page.slice(&messages), total, page))
    }

    async fn count_unread(&self) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.contact_messages.values().filter(|m| !m.read).count() as u64)
    }

    async fn delete(&self, id: &ContactMessageId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables
            .contact_messages
            .remove(id)
            .map(|_| ())
            .ok_or_else(message_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn referral_names_are_unique_case_insensitively() {
        let store = InMemoryStore::new();
        let first = ReferralSource::new(ReferralSourceId::new(), "Instagram").unwrap();
        ReferralSourceRepository::save(&store, &first).await.unwrap();

        let dup = ReferralSource::new(ReferralSourceId::new(), "  instagram ").unwrap();
        let err = ReferralSourceRepository::save(&store, &dup).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReferralSourceExists);
    }

    #[tokio::test]
    async fn active_only_listing_hides_inactive_sources() {
        let store = InMemoryStore::new();
        let mut flyer = ReferralSource::new(ReferralSourceId::new(), "Flyer").unwrap();
        flyer.set_active(false);
        ReferralSourceRepository::save(&store, &flyer).await.unwrap();
        let friend = ReferralSource::new(ReferralSourceId::new(), "Friend").unwrap();
        ReferralSourceRepository::save(&store, &friend).await.unwrap();

        assert_eq!(ReferralSourceRepository::list(&store, true).await.unwrap().len(), 1);
        assert_eq!(ReferralSourceRepository::list(&store, false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unread_messages_sort_first() {
        let store = InMemoryStore::new();
        let email = "visitor@example.org";
        let mut read = ContactMessage::submit(
            ContactMessageId::new(),
            "Visitor",
            email,
            None,
            "Already seen",
        )
        .unwrap();
        read.mark_read(true);
        let unread =
            ContactMessage::submit(ContactMessageId::new(), "Visitor", email, None, "New one")
                .unwrap();
        ContactMessageRepository::save(&store, &read).await.unwrap();
        ContactMessageRepository::save(&store, &unread).await.unwrap();

        let page = ContactMessageRepository::list(&store, Page::default()).await.unwrap();
        assert_eq!(page.items[0].id, unread.id);
        assert_eq!(store.count_unread().await.unwrap(), 1);
    }
}
