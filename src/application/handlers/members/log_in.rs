//! LogInMemberHandler - Email and password login for members.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Email, ErrorCode, Principal};
use crate::domain::member::Member;
use crate::ports::{IssuedToken, MemberRepository, PasswordHasher, TokenService};

#[derive(Debug, Clone)]
pub struct LogInMemberCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LogInMemberResult {
    pub member: Member,
    pub token: IssuedToken,
}

pub struct LogInMemberHandler {
    members: Arc<dyn MemberRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

/// Same error for unknown email and wrong password.
pub(crate) fn invalid_credentials() -> DomainError {
    DomainError::new(ErrorCode::InvalidCredentials, "Invalid email or password")
}

impl LogInMemberHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            members,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: LogInMemberCommand) -> Result<LogInMemberResult, DomainError> {
        let email = Email::parse(&cmd.email).map_err(|_| invalid_credentials())?;
        let Some(member) = self.members.find_by_email(&email).await? else {
            tracing::info!("Member login for unknown email");
            return Err(invalid_credentials());
        };
        if !self.hasher.verify(&cmd.password, &member.password_hash)? {
            tracing::info!(member_id = %member.id, "Member login with wrong password");
            return Err(invalid_credentials());
        }

        let token = self
            .tokens
            .issue(&Principal::Member {
                id: member.id,
                email: member.email.as_str().to_string(),
            })
            .await?;
        tracing::info!(member_id = %member.id, "Member logged in");
        Ok(LogInMemberResult { member, token })
    }
}
