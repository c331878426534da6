//! Member aggregate.
//!
//! A member is the end-user record: profile, login credentials, and the
//! membership status/expiry pair that decides access to member pricing.
//!
//! # Invariants
//!
//! - `email` is unique and stored normalized
//! - `membership_expires_at` is set whenever `status` is Active
//! - status changes follow [`MembershipStatus`] transitions

use crate::domain::foundation::{
    optional_text, required_text, DomainError, Email, ErrorCode, MemberId, ReferralSourceId,
    StateMachine, Timestamp, ValidationError,
};

use super::MembershipStatus;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 40;
pub const MAX_NOTES_LEN: usize = 5000;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 256;

/// Club member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub referral_source_id: Option<ReferralSourceId>,
    pub status: MembershipStatus,
    pub membership_expires_at: Option<Timestamp>,
    pub stripe_customer_id: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validated profile fields for a new member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub referral_source_id: Option<ReferralSourceId>,
}

impl NewMember {
    pub fn parse(
        email: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        referral_source_id: Option<ReferralSourceId>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            email: Email::parse(email)?,
            first_name: required_text("first_name", first_name, MAX_NAME_LEN)?,
            last_name: required_text("last_name", last_name, MAX_NAME_LEN)?,
            phone: optional_text("phone", phone, MAX_PHONE_LEN)?,
            referral_source_id,
        })
    }
}

/// Checks password length bounds before hashing.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::invalid_format(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::too_long("password", MAX_PASSWORD_LEN));
    }
    Ok(())
}

impl Member {
    /// Creates a Pending member awaiting the first membership payment.
    pub fn sign_up(id: MemberId, profile: NewMember, password_hash: String) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            email: profile.email,
            password_hash,
            first_name: profile.first_name,
            last_name: profile.last_name,
            phone: profile.phone,
            referral_source_id: profile.referral_source_id,
            status: MembershipStatus::Pending,
            membership_expires_at: None,
            stripe_customer_id: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Active with an expiry still in the future.
    pub fn has_access(&self, now: &Timestamp) -> bool {
        self.status == MembershipStatus::Active
            && self
                .membership_expires_at
                .map(|expires| expires.is_after(now))
                .unwrap_or(false)
    }

    /// Whether a new membership checkout may start.
    ///
    /// Refused only while the membership is active and more than
    /// `renewal_window_days` away from expiry.
    pub fn can_start_membership_checkout(&self, now: &Timestamp, renewal_window_days: i64) -> bool {
        if !self.has_access(now) {
            return true;
        }
        match self.membership_expires_at {
            Some(expires) => !expires.is_after(&now.add_days(renewal_window_days)),
            None => true,
        }
    }

    /// Activates (or renews) the membership for `period_days`.
    ///
    /// A still-running membership is extended from its current expiry;
    /// otherwise the new period starts at `now`.
    pub fn activate_membership(&mut self, now: Timestamp, period_days: i64) -> Result<(), DomainError> {
        let start = match self.membership_expires_at {
            Some(expires) if self.has_access(&now) => expires,
            _ => now,
        };
        self.status = self.status.transition_to(MembershipStatus::Active)?;
        self.membership_expires_at = Some(start.add_days(period_days));
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancels the membership; used by admins and by full membership refunds.
    pub fn cancel_membership(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(MembershipStatus::Cancelled)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Moves an Active membership whose expiry has passed to Expired.
    ///
    /// Returns true if the status changed.
    pub fn expire_if_lapsed(&mut self, now: &Timestamp) -> bool {
        let lapsed = self.status == MembershipStatus::Active
            && self
                .membership_expires_at
                .map(|expires| !expires.is_after(now))
                .unwrap_or(true);
        if lapsed {
            self.status = MembershipStatus::Expired;
            self.updated_at = Timestamp::now();
        }
        lapsed
    }

    /// Admin status change. Activating requires an expiry, either given or
    /// already on record.
    pub fn set_status(
        &mut self,
        status: MembershipStatus,
        expires_at: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        let next = self.status.transition_to(status).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("from", self.status.as_str())
                .with_detail("to", status.as_str())
        })?;
        let expiry = expires_at.or(self.membership_expires_at);
        if next == MembershipStatus::Active && expiry.is_none() {
            return Err(DomainError::validation(
                "membership_expires_at",
                "An expiry date is required to activate a membership",
            ));
        }
        self.status = next;
        if expires_at.is_some() {
            self.membership_expires_at = expires_at;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Applies a profile update. Blank phone clears it.
    pub fn update_profile(
        &mut self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), ValidationError> {
        if let Some(first) = first_name {
            self.first_name = required_text("first_name", first, MAX_NAME_LEN)?;
        }
        if let Some(last) = last_name {
            self.last_name = required_text("last_name", last, MAX_NAME_LEN)?;
        }
        if phone.is_some() {
            self.phone = optional_text("phone", phone, MAX_PHONE_LEN)?;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn change_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Timestamp::now();
    }

    pub fn set_admin_notes(&mut self, notes: Option<&str>) -> Result<(), ValidationError> {
        self.admin_notes = optional_text("admin_notes", notes, MAX_NOTES_LEN)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
