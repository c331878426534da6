//! Contact form submissions.

use crate::domain::foundation::{
    optional_text, required_text, ContactMessageId, Email, Timestamp, ValidationError,
};

pub const MAX_CONTACT_NAME_LEN: usize = 100;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: Email,
    pub subject: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
}

impl ContactMessage {
    pub fn submit(
        id: ContactMessageId,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: required_text("name", name, MAX_CONTACT_NAME_LEN)?,
            email: Email::parse(email)?,
            subject: optional_text("subject", subject, MAX_SUBJECT_LEN)?,
            message: required_text("message", message, MAX_MESSAGE_LEN)?,
            read: false,
            created_at: Timestamp::now(),
        })
    }

    pub fn mark_read(&mut self, read: bool) {
        self.read = read;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_validates_fields() {
        let msg = ContactMessage::submit(
            ContactMessageId::new(),
            "Grace",
            "GRACE@example.org",
            None,
            "Do you host weddings?",
        )
        .unwrap();
        assert!(!msg.read);
        assert_eq!(msg.email.as_str(), "grace@example.org");
    }

    #[test]
    fn message_length_is_bounded() {
        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(ContactMessage::submit(ContactMessageId::new(), "G", "g@e.org", None, &long).is_err());
        assert!(ContactMessage::submit(ContactMessageId::new(), "G", "g@e.org", None, "  ").is_err());
        let max = "x".repeat(MAX_MESSAGE_LEN);
        assert!(ContactMessage::submit(ContactMessageId::new(), "G", "g@e.org", None, &max).is_ok());
    }
}
