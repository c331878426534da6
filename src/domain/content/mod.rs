//! Public site content and contact messages.

mod contact_message;
mod site_content;

pub use contact_message::{ContactMessage, MAX_MESSAGE_LEN, MAX_SUBJECT_LEN};
pub use site_content::{ContactDetails, FaqEntry, HomeContent, SiteContent};
