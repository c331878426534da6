//! Contact form submissions and the back-office inbox.

use std::sync::Arc;

use crate::domain::content::ContactMessage;
use crate::domain::foundation::{ContactMessageId, DomainError, ErrorCode};
use crate::ports::{ContactMessageRepository, Page, Paginated};

async fn load(
    messages: &dyn ContactMessageRepository,
    id: &ContactMessageId,
) -> Result<ContactMessage, DomainError> {
    messages.find_by_id(id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::ContactMessageNotFound, "Message not found")
            .with_detail("message_id", id.to_string())
    })
}

#[derive(Debug, Clone, Default)]
pub struct SubmitContactCommand {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

pub struct SubmitContactHandler {
    messages: Arc<dyn ContactMessageRepository>,
}

impl SubmitContactHandler {
    pub fn new(messages: Arc<dyn ContactMessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, cmd: SubmitContactCommand) -> Result<ContactMessage, DomainError> {
        let message = ContactMessage::submit(
            ContactMessageId::new(),
            &cmd.name,
            &cmd.email,
            cmd.subject.as_deref(),
            &cmd.message,
        )?;
        self.messages.save(&message).await?;
        tracing::info!(message_id = %message.id, "Contact message received");
        Ok(message)
    }
}

/// Inbox listing: unread first, then newest.
pub struct ListContactMessagesHandler {
    messages: Arc<dyn ContactMessageRepository>,
}

impl ListContactMessagesHandler {
    pub fn new(messages: Arc<dyn ContactMessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, page: Page) -> Result<Paginated<ContactMessage>, DomainError> {
        self.messages.list(page).await
    }
}

pub struct CountUnreadMessagesHandler {
    messages: Arc<dyn ContactMessageRepository>,
}

impl CountUnreadMessagesHandler {
    pub fn new(messages: Arc<dyn ContactMessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self) -> Result<u64, DomainError> {
        self.messages.count_unread().await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarkMessageReadCommand {
    pub message_id: ContactMessageId,
    pub read: bool,
}

pub struct MarkMessageReadHandler {
    messages: Arc<dyn ContactMessageRepository>,
}

impl MarkMessageReadHandler {
    pub fn new(messages: Arc<dyn ContactMessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, cmd: MarkMessageReadCommand) -> Result<ContactMessage, DomainError> {
        let mut message = load(self.messages.as_ref(), &cmd.message_id).await?;
        message.mark_read(cmd.read);
        self.messages.update(&message).await?;
        Ok(message)
    }
}

pub struct DeleteMessageHandler {
    messages: Arc<dyn ContactMessageRepository>,
}

impl DeleteMessageHandler {
    pub fn new(messages: Arc<dyn ContactMessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, id: ContactMessageId) -> Result<(), DomainError> {
        let message = load(self.messages.as_ref(), &id).await?;
        self.messages.delete(&message.id).await?;
        tracing::info!(message_id = %message.id, "Contact message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;

    fn command(name: &str, message: &str) -> SubmitContactCommand {
        SubmitContactCommand {
            name: name.into(),
            email: "visitor@example.org".into(),
            subject: Some("Hello".into()),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn submit_validates_message_length() {
        let handler = SubmitContactHandler::new(Arc::new(InMemoryStore::new()));

        let err = handler.handle(command("Visitor", "   ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = handler
            .handle(command("Visitor", &"x".repeat(5_001)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        assert!(handler.handle(command("Visitor", &"x".repeat(5_000))).await.is_ok());
    }

    #[tokio::test]
    async fn inbox_lists_unread_first_and_tracks_count() {
        let store = InMemoryStore::new();
        let submit = SubmitContactHandler::new(Arc::new(store.clone()));
        let older = submit.handle(command("Older", "first")).await.unwrap();
        submit.handle(command("Newer", "second")).await.unwrap();

        let count = CountUnreadMessagesHandler::new(Arc::new(store.clone()));
        assert_eq!(count.handle().await.unwrap(), 2);

        MarkMessageReadHandler::new(Arc::new(store.clone()))
            .handle(MarkMessageReadCommand {
                message_id: older.id,
                read: true,
            })
            .await
            .unwrap();
        assert_eq!(count.handle().await.unwrap(), 1);

        let inbox = ListContactMessagesHandler::new(Arc::new(store.clone()))
            .handle(Page::default())
            .await
            .unwrap();
        assert_eq!(inbox.items[0].name, "Newer");
        assert_eq!(inbox.items[1].id, older.id);

        let delete = DeleteMessageHandler::new(Arc::new(store));
        delete.handle(older.id).await.unwrap();
        let err = delete.handle(older.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ContactMessageNotFound);
    }
}
