//! Contact message repository port.

use async_trait::async_trait;

use crate::domain::content::ContactMessage;
use crate::domain::foundation::{ContactMessageId, DomainError};

use super::{Page, Paginated};

#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    async fn save(&self, message: &ContactMessage) -> Result<(), DomainError>;

    async fn update(&self, message: &ContactMessage) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ContactMessageId)
        -> Result<Option<ContactMessage>, DomainError>;

    /// Unread first, then newest first.
    async fn list(&self, page: Page) -> Result<Paginated<ContactMessage>, DomainError>;

    async fn count_unread(&self) -> Result<u64, DomainError>;

    async fn delete(&self, id: &ContactMessageId) -> Result<(), DomainError>;
}
