use serde::{Deserialize, Serialize};

use crate::adapters::http::dto::{
    CheckoutResponse, EventResponse, MemberResponse, RsvpResponse, TokenResponse,
};
use crate::domain::foundation::ReferralSourceId;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub referral_source_id: Option<ReferralSourceId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

/// Omitted fields are left unchanged; a blank phone clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeatsRequest {
    #[serde(default)]
    pub guests: u32,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub member: MemberResponse,
    pub token: TokenResponse,
    /// Absent when checkout could not be started; retry via
    /// `POST /api/members/me/membership/checkout`.
    pub checkout: Option<CheckoutResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub member: MemberResponse,
    pub token: TokenResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    pub rsvp: RsvpResponse,
    pub event: EventResponse,
}
