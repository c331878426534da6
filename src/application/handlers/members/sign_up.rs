//! SignUpHandler - Creates a Pending member and opens the membership checkout.

use std::sync::Arc;

use crate::application::handlers::payments::{CheckoutRedirects, CheckoutStarted, CheckoutStarter};
use crate::application::ClubSettings;
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, PaymentId, Principal, ReferralSourceId,
};
use crate::domain::member::{validate_password, Member, NewMember};
use crate::domain::payment::Payment;
use crate::ports::{
    IssuedToken, MemberRepository, PasswordHasher, ReferralSourceRepository, TokenService,
};

#[derive(Debug, Clone)]
pub struct SignUpCommand {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub referral_source_id: Option<ReferralSourceId>,
}

#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub member: Member,
    pub token: IssuedToken,
    /// `None` when Stripe was unreachable; the member can retry from the profile.
    pub checkout: Option<CheckoutStarted>,
}

pub struct SignUpHandler {
    members: Arc<dyn MemberRepository>,
    referral_sources: Arc<dyn ReferralSourceRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    checkout: CheckoutStarter,
    settings: ClubSettings,
}

impl SignUpHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        referral_sources: Arc<dyn ReferralSourceRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        checkout: CheckoutStarter,
        settings: ClubSettings,
    ) -> Self {
        Self {
            members,
            referral_sources,
            hasher,
            tokens,
            checkout,
            settings,
        }
    }

    pub async fn handle(&self, cmd: SignUpCommand) -> Result<SignUpResult, DomainError> {
        validate_password(&cmd.password)?;
        let profile = NewMember::parse(
            &cmd.email,
            &cmd.first_name,
            &cmd.last_name,
            cmd.phone.as_deref(),
            cmd.referral_source_id,
        )?;

        if let Some(source_id) = profile.referral_source_id {
            let known = self
                .referral_sources
                .find_by_id(&source_id)
                .await?
                .map(|source| source.active)
                .unwrap_or(false);
            if !known {
                return Err(DomainError::validation(
                    "referral_source_id",
                    "Unknown referral source",
                ));
            }
        }

        if self.members.find_by_email(&profile.email).await?.is_some() {
            return Err(DomainError::new(
                ErrorCode::MemberExists,
                "An account with this email already exists",
            ));
        }

        let hash = self.hasher.hash(&cmd.password)?;
        let member = Member::sign_up(MemberId::new(), profile, hash);
        self.members.save(&member).await?;
        tracing::info!(member_id = %member.id, "Member signed up");

        let token = self
            .tokens
            .issue(&Principal::Member {
                id: member.id,
                email: member.email.as_str().to_string(),
            })
            .await?;

        let checkout = match self.start_checkout(&member).await {
            Ok(started) => Some(started),
            Err(e) => {
                tracing::warn!(
                    member_id = %member.id,
                    error = %e,
                    "Membership checkout not started at signup"
                );
                None
            }
        };

        Ok(SignUpResult {
            member,
            token,
            checkout,
        })
    }

    async fn start_checkout(&self, member: &Member) -> Result<CheckoutStarted, DomainError> {
        let product = format!("{} membership", self.settings.club_name);
        let payment = Payment::membership(
            PaymentId::new(),
            member.id,
            self.settings.membership_fee()?,
            product.clone(),
        );
        self.checkout
            .start(
                payment,
                member,
                &product,
                CheckoutRedirects {
                    success_url: self.settings.success_url("/membership/success"),
                    cancel_url: self.settings.cancel_url("/membership"),
                },
            )
            .await
    }
}
