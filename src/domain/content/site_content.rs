//! Static public page content.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeContent {
    pub headline: String,
    pub intro: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Home, about, FAQ and contact content served to the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    pub club_name: String,
    pub home: HomeContent,
    pub about: String,
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    #[serde(default)]
    pub contact: ContactDetails,
}

impl SiteContent {
    /// Checks required text is present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.club_name.trim().is_empty() {
            return Err(ValidationError::empty_field("club_name"));
        }
        if self.home.headline.trim().is_empty() {
            return Err(ValidationError::empty_field("home.headline"));
        }
        for (idx, entry) in self.faq.iter().enumerate() {
            if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
                return Err(ValidationError::empty_field(format!("faq[{}]", idx)));
            }
        }
        Ok(())
    }
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            club_name: "Clubhouse".to_string(),
            home: HomeContent {
                headline: "Welcome to the club".to_string(),
                intro: String::new(),
            },
            about: String::new(),
            faq: Vec::new(),
            contact: ContactDetails::default(),
        }
    }
}
