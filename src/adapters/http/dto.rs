//! Response DTOs shared by all route groups.
//!
//! Domain entities stay free of wire concerns; these views decide what leaves
//! the process. Password hashes and Stripe identifiers never do.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::handlers::payments::{CheckoutStarted, RenderedReceipt};
use crate::domain::admin::AdminUser;
use crate::domain::content::ContactMessage;
use crate::domain::event::{Event, PricingTiers, Rsvp, RsvpStatus};
use crate::domain::foundation::{
    AdminRole, AdminUserId, ContactMessageId, EventId, GalleryImageId, MemberId, PaymentId,
    ReferralSourceId, RsvpId, Timestamp,
};
use crate::domain::gallery::{GalleryImage, ImageContentType};
use crate::domain::marketing::ReferralSource;
use crate::domain::member::{Member, MembershipStatus};
use crate::domain::payment::{Payment, PaymentPurpose, PaymentStatus};
use crate::ports::{IssuedToken, Paginated};

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PageResponse<T> {
    pub fn map<U>(page: Paginated<U>, f: impl FnMut(U) -> T) -> Self {
        Self {
            items: page.items.into_iter().map(f).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: Timestamp,
}

impl From<IssuedToken> for TokenResponse {
    fn from(t: IssuedToken) -> Self {
        Self {
            token: t.token,
            expires_at: t.expires_at,
        }
    }
}

/// Where to send the browser to pay.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub payment_id: PaymentId,
    pub checkout_url: String,
}

impl From<CheckoutStarted> for CheckoutResponse {
    fn from(started: CheckoutStarted) -> Self {
        Self {
            payment_id: started.payment.id,
            checkout_url: started.checkout_url,
        }
    }
}

/// A member's own view of the account.
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub referral_source_id: Option<ReferralSourceId>,
    pub status: MembershipStatus,
    pub membership_expires_at: Option<Timestamp>,
    pub has_access: bool,
    pub created_at: Timestamp,
}

impl From<&Member> for MemberResponse {
    fn from(m: &Member) -> Self {
        Self {
            id: m.id,
            email: m.email.as_str().to_string(),
            first_name: m.first_name.clone(),
            last_name: m.last_name.clone(),
            phone: m.phone.clone(),
            referral_source_id: m.referral_source_id,
            status: m.status,
            membership_expires_at: m.membership_expires_at,
            has_access: m.has_access(&Timestamp::now()),
            created_at: m.created_at,
        }
    }
}

/// Back-office view: adds the internal notes.
#[derive(Debug, Clone, Serialize)]
pub struct AdminMemberResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub admin_notes: Option<String>,
    pub updated_at: Timestamp,
}

impl From<&Member> for AdminMemberResponse {
    fn from(m: &Member) -> Self {
        Self {
            member: MemberResponse::from(m),
            admin_notes: m.admin_notes.clone(),
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserResponse {
    pub id: AdminUserId,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub created_at: Timestamp,
}

impl From<&AdminUser> for AdminUserResponse {
    fn from(a: &AdminUser) -> Self {
        Self {
            id: a.id,
            email: a.email.as_str().to_string(),
            name: a.name.clone(),
            role: a.role,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub pricing: PricingTiers,
    pub capacity: Option<u32>,
    pub seats_available: Option<u32>,
    pub rsvp_count: u32,
    pub image_url: Option<String>,
}

impl From<&Event> for EventResponse {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id,
            title: e.title.clone(),
            description: e.description.clone(),
            location: e.location.clone(),
            starts_at: e.starts_at,
            ends_at: e.ends_at,
            pricing: e.pricing.clone(),
            capacity: e.capacity,
            seats_available: e.seats_available(),
            rsvp_count: e.rsvp_count,
            image_url: e.image_url.clone(),
        }
    }
}

/// Back-office event view with draft state and attendance.
#[derive(Debug, Clone, Serialize)]
pub struct AdminEventResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub published: bool,
    pub checked_in_count: u32,
    pub utilization: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Event> for AdminEventResponse {
    fn from(e: &Event) -> Self {
        Self {
            event: EventResponse::from(e),
            published: e.published,
            checked_in_count: e.checked_in_count,
            utilization: e.utilization(),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpResponse {
    pub id: RsvpId,
    pub event_id: EventId,
    pub member_id: MemberId,
    pub guests: u32,
    pub seats: u32,
    pub status: RsvpStatus,
    pub checked_in: bool,
    pub payment_id: Option<PaymentId>,
    pub created_at: Timestamp,
}

impl From<&Rsvp> for RsvpResponse {
    fn from(r: &Rsvp) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            member_id: r.member_id,
            guests: r.guests,
            seats: r.seats(),
            status: r.status,
            checked_in: r.checked_in,
            payment_id: r.payment_id,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub member_id: Option<MemberId>,
    pub event_id: Option<EventId>,
    pub purpose: PaymentPurpose,
    pub description: String,
    pub amount_cents: i64,
    pub refunded_cents: i64,
    pub currency: String,
    pub amount_display: String,
    pub status: PaymentStatus,
    pub guests: u32,
    pub has_receipt: bool,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl From<&Payment> for PaymentResponse {
    fn from(p: &Payment) -> Self {
        Self {
            id: p.id,
            member_id: p.member_id,
            event_id: p.event_id,
            purpose: p.purpose,
            description: p.description.clone(),
            amount_cents: p.amount.amount_cents(),
            refunded_cents: p.refunded_cents,
            currency: p.amount.currency().to_string(),
            amount_display: p.amount.display(),
            status: p.status,
            guests: p.guests,
            has_receipt: p.has_receipt(),
            created_at: p.created_at,
            paid_at: p.paid_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryImageResponse {
    pub id: GalleryImageId,
    pub title: String,
    pub caption: Option<String>,
    pub url: String,
    pub content_type: ImageContentType,
    pub size_bytes: u64,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

impl From<&GalleryImage> for GalleryImageResponse {
    fn from(i: &GalleryImage) -> Self {
        Self {
            id: i.id,
            title: i.title.clone(),
            caption: i.caption.clone(),
            url: i.url.clone(),
            content_type: i.content_type,
            size_bytes: i.size_bytes,
            sort_order: i.sort_order,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralSourceResponse {
    pub id: ReferralSourceId,
    pub name: String,
    pub active: bool,
}

impl From<&ReferralSource> for ReferralSourceResponse {
    fn from(s: &ReferralSource) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            active: s.active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessageResponse {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
}

impl From<&ContactMessage> for ContactMessageResponse {
    fn from(m: &ContactMessage) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            email: m.email.as_str().to_string(),
            subject: m.subject.clone(),
            message: m.message.clone(),
            read: m.read,
            created_at: m.created_at,
        }
    }
}

/// PDF receipt served as a download.
pub struct ReceiptDownload(pub RenderedReceipt);

impl IntoResponse for ReceiptDownload {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.0.file_name);
        (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.0.pdf,
        )
            .into_response()
    }
}
