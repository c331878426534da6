//! In-memory persistence.
//!
//! `InMemoryStore` implements every repository port plus the marketing read
//! model over a single lock, so multi-row operations (seat reservations,
//! member deletion) are atomic the same way the PostgreSQL transactions are.
//! Used by tests and by `database.backend = memory` demos.

mod content;
mod events;
mod gallery;
mod marketing;
mod members;
mod payments;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::admin::AdminUser;
use crate::domain::content::ContactMessage;
use crate::domain::event::{Event, Rsvp};
use crate::domain::foundation::{
    AdminUserId, ContactMessageId, EventId, GalleryImageId, MemberId, PaymentId,
    ReferralSourceId, RsvpId,
};
use crate::domain::gallery::GalleryImage;
use crate::domain::marketing::ReferralSource;
use crate::domain::member::Member;
use crate::domain::payment::Payment;

#[derive(Debug, Default)]
struct Tables {
    members: HashMap<MemberId, Member>,
    admin_users: HashMap<AdminUserId, AdminUser>,
    events: HashMap<EventId, Event>,
    rsvps: HashMap<RsvpId, Rsvp>,
    gallery: HashMap<GalleryImageId, GalleryImage>,
    payments: HashMap<PaymentId, Payment>,
    referral_sources: HashMap<ReferralSourceId, ReferralSource>,
    contact_messages: HashMap<ContactMessageId, ContactMessage>,
}

/// Shared in-memory backing for all repositories. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
