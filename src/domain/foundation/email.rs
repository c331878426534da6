//! Normalized email address.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

const MAX_EMAIL_LEN: usize = 254;

/// Email address stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parses and normalizes an address.
    ///
    /// Requires exactly one `@` with non-empty local and domain parts and no
    /// whitespace.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if normalized.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::too_long("email", MAX_EMAIL_LEN));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format("email", "contains whitespace"));
        }
        let mut parts = normalized.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if parts.next().is_some() || local.is_empty() || domain.is_empty() {
            return Err(ValidationError::invalid_format(
                "email",
                "must look like name@example.org",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
