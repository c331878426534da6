//! Member repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Email, MemberId, Timestamp};
use crate::domain::member::{Member, MembershipStatus};

use super::{Page, Paginated};

/// Admin list filter.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Case-insensitive match on first name, last name or email.
    pub search: Option<String>,
    pub status: Option<MembershipStatus>,
}

impl MemberFilter {
    /// In-memory equivalent of the SQL filter.
    pub fn matches(&self, member: &Member) -> bool {
        if let Some(status) = self.status {
            if member.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                member.first_name.to_lowercase().contains(&needle)
                    || member.last_name.to_lowercase().contains(&needle)
                    || member.email.as_str().contains(&needle)
            }
        }
    }
}

/// Persistence for Member aggregates.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a new member.
    ///
    /// # Errors
    ///
    /// - `MemberExists` if the email is already registered
    async fn save(&self, member: &Member) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `MemberNotFound` if the member does not exist
    async fn update(&self, member: &Member) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, DomainError>;

    /// Newest first.
    async fn list(&self, filter: &MemberFilter, page: Page)
        -> Result<Paginated<Member>, DomainError>;

    /// # Errors
    ///
    /// - `MemberNotFound` if the member does not exist
    async fn delete(&self, id: &MemberId) -> Result<(), DomainError>;

    /// Moves every Active member whose expiry is at or before `now` to
    /// Expired. Returns how many changed.
    async fn expire_lapsed(&self, now: &Timestamp) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::NewMember;

    #[test]
    fn member_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn MemberRepository) {}
    }

    #[test]
    fn filter_matches_name_email_and_status() {
        let profile = NewMember::parse("ada@example.org", "Ada", "Lovelace", None, None).unwrap();
        let member = Member::sign_up(MemberId::new(), profile, "h".into());

        assert!(MemberFilter::default().matches(&member));
        assert!(MemberFilter { search: Some("LOVE".into()), status: None }.matches(&member));
        assert!(MemberFilter { search: Some("example.org".into()), status: None }.matches(&member));
        assert!(!MemberFilter { search: Some("babbage".into()), status: None }.matches(&member));
        assert!(!MemberFilter {
            search: None,
            status: Some(MembershipStatus::Active)
        }
        .matches(&member));
    }
}
