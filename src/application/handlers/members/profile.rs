//! Member self-service profile: view and update.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Timestamp};
use crate::domain::member::{validate_password, Member};
use crate::ports::{MemberRepository, PasswordHasher};

fn member_not_found(id: &MemberId) -> DomainError {
    DomainError::new(ErrorCode::MemberNotFound, "Member not found")
        .with_detail("member_id", id.to_string())
}

/// Loads a member, persisting the move to Expired if their membership lapsed.
pub(crate) async fn load_current(
    members: &dyn MemberRepository,
    id: &MemberId,
) -> Result<Member, DomainError> {
    let mut member = members
        .find_by_id(id)
        .await?
        .ok_or_else(|| member_not_found(id))?;
    if member.expire_if_lapsed(&Timestamp::now()) {
        members.update(&member).await?;
        tracing::info!(member_id = %member.id, "Membership expired");
    }
    Ok(member)
}

/// Settles every lapsed membership before a read that reports on status.
pub(crate) async fn expire_lapsed(members: &dyn MemberRepository) -> Result<(), DomainError> {
    let expired = members.expire_lapsed(&Timestamp::now()).await?;
    if expired > 0 {
        tracing::info!(count = expired, "Lapsed memberships expired");
    }
    Ok(())
}

pub struct GetProfileHandler {
    members: Arc<dyn MemberRepository>,
}

impl GetProfileHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, member_id: MemberId) -> Result<Member, DomainError> {
        load_current(self.members.as_ref(), &member_id).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileCommand {
    pub member_id: MemberId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Blank clears the phone number.
    pub phone: Option<String>,
    pub password: Option<String>,
}

pub struct UpdateProfileHandler {
    members: Arc<dyn MemberRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UpdateProfileHandler {
    pub fn new(members: Arc<dyn MemberRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { members, hasher }
    }

    pub async fn handle(&self, cmd: UpdateProfileCommand) -> Result<Member, DomainError> {
        let mut member = load_current(self.members.as_ref(), &cmd.member_id).await?;

        member.update_profile(
            cmd.first_name.as_deref(),
            cmd.last_name.as_deref(),
            cmd.phone.as_deref(),
        )?;
        if let Some(password) = cmd.password.as_deref() {
            validate_password(password)?;
            member.change_password_hash(self.hasher.hash(password)?);
        }

        self.members.update(&member).await?;
        tracing::info!(
            member_id = %member.id,
            password_changed = cmd.password.is_some(),
            "Member profile updated"
        );
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::test_support;
    use crate::domain::member::MembershipStatus;

    #[tokio::test]
    async fn lapsed_membership_is_expired_on_read() {
        let store = InMemoryStore::new();
        let mut member = test_support::member(&store, "ada@example.org").await;
        member
            .set_status(MembershipStatus::Active, Some(Timestamp::now().add_days(-1)))
            .unwrap();
        MemberRepository::update(&store, &member).await.unwrap();

        let profile = GetProfileHandler::new(Arc::new(store.clone()))
            .handle(member.id)
            .await
            .unwrap();
        assert_eq!(profile.status, MembershipStatus::Expired);

        let stored = MemberRepository::find_by_id(&store, &member.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MembershipStatus::Expired);
    }

    #[tokio::test]
    async fn update_changes_names_phone_and_password() {
        let store = InMemoryStore::new();
        let member = test_support::member(&store, "ada@example.org").await;
        let hasher = test_support::hasher();
        let handler = UpdateProfileHandler::new(Arc::new(store.clone()), hasher.clone());

        let updated = handler
            .handle(UpdateProfileCommand {
                member_id: member.id,
                first_name: Some("Augusta".into()),
                phone: Some("+44 20 7946 0000".into()),
                password: Some("a much longer secret".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name, "Lovelace");
        assert_eq!(updated.phone.as_deref(), Some("+44 20 7946 0000"));
        assert!(hasher.verify("a much longer secret", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let store = InMemoryStore::new();
        let member = test_support::member(&store, "ada@example.org").await;
        let handler = UpdateProfileHandler::new(Arc::new(store), test_support::hasher());

        let err = handler
            .handle(UpdateProfileCommand {
                member_id: member.id,
                password: Some("short".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_member_is_not_found() {
        let handler = GetProfileHandler::new(Arc::new(InMemoryStore::new()));
        let err = handler.handle(MemberId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberNotFound);
    }
}
