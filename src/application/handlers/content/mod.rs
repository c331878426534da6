//! Content handlers.
//!
//! ## Commands
//! - Submitting the contact form
//! - Back office: marking messages read, deleting them
//!
//! ## Queries
//! - Site content
//! - Back office: inbox and unread count

mod contact;
mod site;

pub use contact::{
    CountUnreadMessagesHandler, DeleteMessageHandler, ListContactMessagesHandler,
    MarkMessageReadCommand, MarkMessageReadHandler, SubmitContactCommand, SubmitContactHandler,
};
pub use site::GetSiteContentHandler;
