//! Referral sources for marketing attribution.

use crate::domain::foundation::{required_text, ReferralSourceId, Timestamp, ValidationError};

pub const MAX_SOURCE_NAME_LEN: usize = 100;

/// "How did you hear about us?" option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralSource {
    pub id: ReferralSourceId,
    pub name: String,
    pub active: bool,
    pub created_at: Timestamp,
}

impl ReferralSource {
    pub fn new(id: ReferralSourceId, name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: normalize_name(name)?,
            active: true,
            created_at: Timestamp::now(),
        })
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Uniqueness key; names compare case-insensitively.
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// Case-insensitive comparison key for a source name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trims and collapses inner whitespace.
fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    required_text("name", &collapsed, MAX_SOURCE_NAME_LEN)
}
