//! Request and response DTOs for back-office endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::dto::{
    AdminMemberResponse, AdminUserResponse, EventResponse, PaymentResponse, RsvpResponse,
    TokenResponse,
};
use crate::domain::foundation::{AdminRole, MemberId, Timestamp};
use crate::domain::member::MembershipStatus;
use crate::domain::payment::{PaymentPurpose, PaymentStatus};
use crate::ports::{PaginationQuery, RefundReason};

// ════════════════════════════════════════════════════════════════════════════════
// Query strings
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberListParams {
    pub search: Option<String>,
    pub status: Option<MembershipStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentListParams {
    pub status: Option<PaymentStatus>,
    pub purpose: Option<PaymentPurpose>,
    pub member_id: Option<MemberId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Request bodies
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLogInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: MembershipStatus,
    #[serde(default)]
    pub membership_expires_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNotesRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAdminUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<AdminRole>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateImageRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub reason: Option<RefundReason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferralSourceRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReferralSourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadRequest {
    pub read: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct AdminSessionResponse {
    pub admin: AdminUserResponse,
    pub token: TokenResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDetailResponse {
    pub member: AdminMemberResponse,
    pub payments: Vec<PaymentResponse>,
    pub rsvps: Vec<RsvpResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeResponse {
    #[serde(flatten)]
    pub rsvp: RsvpResponse,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInResponse {
    pub rsvp: RsvpResponse,
    pub event: EventResponse,
    pub checked_in_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    pub payment: PaymentResponse,
    pub refund_id: String,
    pub refunded_now_cents: i64,
    pub fully_refunded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}
