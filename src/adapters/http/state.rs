//! Shared application state.
//!
//! Holds the ports as `Arc<dyn Port>`; handlers are built on demand per
//! request, which is cheap since they only clone `Arc`s.

use std::sync::Arc;

use crate::adapters::memory::InMemoryStore;
use crate::application::handlers::admin_users::{
    CreateAdminUserHandler, DeleteAdminUserHandler, ListAdminUsersHandler, LogInAdminHandler,
    UpdateAdminUserHandler,
};
use crate::application::handlers::content::{
    CountUnreadMessagesHandler, DeleteMessageHandler, GetSiteContentHandler,
    ListContactMessagesHandler, MarkMessageReadHandler, SubmitContactHandler,
};
use crate::application::handlers::events::{
    CancelRsvpHandler, CheckInHandler, CreateEventHandler, DeleteEventHandler, GetEventHandler,
    GetPublishedEventHandler, ListEventRsvpsHandler, ListEventsHandler, ListMemberRsvpsHandler,
    ListUpcomingEventsHandler, RsvpHandler, SetEventPublishedHandler, StartEventCheckoutHandler,
    UpdateEventHandler,
};
use crate::application::handlers::gallery::{
    DeleteImageHandler, ListImagesHandler, UpdateImageHandler, UploadImageHandler,
};
use crate::application::handlers::marketing::{
    CreateReferralSourceHandler, DeleteReferralSourceHandler, GetMarketingStatsHandler,
    ListReferralSourcesHandler, UpdateReferralSourceHandler,
};
use crate::application::handlers::members::{
    DeleteMemberHandler, GetMemberHandler, GetProfileHandler, ListMembersHandler,
    LogInMemberHandler, SignUpHandler, StartMembershipCheckoutHandler, UpdateMemberNotesHandler,
    UpdateMemberStatusHandler, UpdateProfileHandler,
};
use crate::application::handlers::payments::{
    CheckoutStarter, GetPaymentHandler, HandleStripeWebhookHandler, ListMemberPaymentsHandler,
    ListPaymentsHandler, RefundPaymentHandler, RenderReceiptHandler,
};
use crate::application::ClubSettings;
use crate::domain::content::SiteContent;
use crate::ports::{
    AdminUserRepository, BlobStorage, ContactMessageRepository, EventRepository,
    GalleryRepository, MarketingReader, MemberRepository, PasswordHasher, PaymentProvider,
    PaymentRepository, RateLimiter, ReceiptRenderer, ReferralSourceRepository, TokenService,
};

/// Repository ports, grouped so both backends can be swapped in one place.
#[derive(Clone)]
pub struct Repositories {
    pub members: Arc<dyn MemberRepository>,
    pub admin_users: Arc<dyn AdminUserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub gallery: Arc<dyn GalleryRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub referral_sources: Arc<dyn ReferralSourceRepository>,
    pub contact_messages: Arc<dyn ContactMessageRepository>,
    pub marketing: Arc<dyn MarketingReader>,
}

impl Repositories {
    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            members: Arc::new(store.clone()),
            admin_users: Arc::new(store.clone()),
            events: Arc::new(store.clone()),
            gallery: Arc::new(store.clone()),
            payments: Arc::new(store.clone()),
            referral_sources: Arc::new(store.clone()),
            contact_messages: Arc::new(store.clone()),
            marketing: Arc::new(store),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub blob_storage: Arc<dyn BlobStorage>,
    pub receipt_renderer: Arc<dyn ReceiptRenderer>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub site_content: Arc<SiteContent>,
    pub settings: ClubSettings,
}

impl AppState {
    fn checkout_starter(&self) -> CheckoutStarter {
        CheckoutStarter::new(self.repos.payments.clone(), self.payment_provider.clone())
    }

    // ── Public ────────────────────────────────────────────────────────────────

    pub fn site_content_handler(&self) -> GetSiteContentHandler {
        GetSiteContentHandler::new(self.site_content.clone())
    }

    pub fn upcoming_events_handler(&self) -> ListUpcomingEventsHandler {
        ListUpcomingEventsHandler::new(self.repos.events.clone())
    }

    pub fn published_event_handler(&self) -> GetPublishedEventHandler {
        GetPublishedEventHandler::new(self.repos.events.clone())
    }

    pub fn list_images_handler(&self) -> ListImagesHandler {
        ListImagesHandler::new(self.repos.gallery.clone())
    }

    pub fn list_referral_sources_handler(&self) -> ListReferralSourcesHandler {
        ListReferralSourcesHandler::new(self.repos.referral_sources.clone())
    }

    pub fn submit_contact_handler(&self) -> SubmitContactHandler {
        SubmitContactHandler::new(self.repos.contact_messages.clone())
    }

    // ── Members ───────────────────────────────────────────────────────────────

    pub fn sign_up_handler(&self) -> SignUpHandler {
        SignUpHandler::new(
            self.repos.members.clone(),
            self.repos.referral_sources.clone(),
            self.password_hasher.clone(),
            self.tokens.clone(),
            self.checkout_starter(),
            self.settings.clone(),
        )
    }

    pub fn member_log_in_handler(&self) -> LogInMemberHandler {
        LogInMemberHandler::new(
            self.repos.members.clone(),
            self.password_hasher.clone(),
            self.tokens.clone(),
        )
    }

    pub fn profile_handler(&self) -> GetProfileHandler {
        GetProfileHandler::new(self.repos.members.clone())
    }

    pub fn update_profile_handler(&self) -> UpdateProfileHandler {
        UpdateProfileHandler::new(self.repos.members.clone(), self.password_hasher.clone())
    }

    pub fn membership_checkout_handler(&self) -> StartMembershipCheckoutHandler {
        StartMembershipCheckoutHandler::new(
            self.repos.members.clone(),
            self.checkout_starter(),
            self.settings.clone(),
        )
    }

    pub fn rsvp_handler(&self) -> RsvpHandler {
        RsvpHandler::new(self.repos.events.clone())
    }

    pub fn cancel_rsvp_handler(&self) -> CancelRsvpHandler {
        CancelRsvpHandler::new(self.repos.events.clone())
    }

    pub fn event_checkout_handler(&self) -> StartEventCheckoutHandler {
        StartEventCheckoutHandler::new(
            self.repos.events.clone(),
            self.repos.members.clone(),
            self.checkout_starter(),
            self.settings.clone(),
        )
    }

    pub fn member_rsvps_handler(&self) -> ListMemberRsvpsHandler {
        ListMemberRsvpsHandler::new(self.repos.events.clone())
    }

    pub fn member_payments_handler(&self) -> ListMemberPaymentsHandler {
        ListMemberPaymentsHandler::new(self.repos.payments.clone())
    }

    pub fn receipt_handler(&self) -> RenderReceiptHandler {
        RenderReceiptHandler::new(
            self.repos.payments.clone(),
            self.repos.members.clone(),
            self.receipt_renderer.clone(),
            self.settings.club_name.clone(),
        )
    }

    // ── Webhooks ──────────────────────────────────────────────────────────────

    pub fn stripe_webhook_handler(&self) -> HandleStripeWebhookHandler {
        HandleStripeWebhookHandler::new(
            self.payment_provider.clone(),
            self.repos.payments.clone(),
            self.repos.members.clone(),
            self.repos.events.clone(),
            self.settings.membership_period_days,
        )
    }

    // ── Back office ───────────────────────────────────────────────────────────

    pub fn admin_log_in_handler(&self) -> LogInAdminHandler {
        LogInAdminHandler::new(
            self.repos.admin_users.clone(),
            self.password_hasher.clone(),
            self.tokens.clone(),
        )
    }

    pub fn list_members_handler(&self) -> ListMembersHandler {
        ListMembersHandler::new(self.repos.members.clone())
    }

    pub fn member_detail_handler(&self) -> GetMemberHandler {
        GetMemberHandler::new(
            self.repos.members.clone(),
            self.repos.payments.clone(),
            self.repos.events.clone(),
        )
    }

    pub fn member_status_handler(&self) -> UpdateMemberStatusHandler {
        UpdateMemberStatusHandler::new(self.repos.members.clone())
    }

    pub fn member_notes_handler(&self) -> UpdateMemberNotesHandler {
        UpdateMemberNotesHandler::new(self.repos.members.clone())
    }

    pub fn delete_member_handler(&self) -> DeleteMemberHandler {
        DeleteMemberHandler::new(
            self.repos.members.clone(),
            self.repos.payments.clone(),
            self.repos.events.clone(),
        )
    }

    pub fn list_admin_users_handler(&self) -> ListAdminUsersHandler {
        ListAdminUsersHandler::new(self.repos.admin_users.clone())
    }

    pub fn create_admin_user_handler(&self) -> CreateAdminUserHandler {
        CreateAdminUserHandler::new(self.repos.admin_users.clone(), self.password_hasher.clone())
    }

    pub fn update_admin_user_handler(&self) -> UpdateAdminUserHandler {
        UpdateAdminUserHandler::new(self.repos.admin_users.clone(), self.password_hasher.clone())
    }

    pub fn delete_admin_user_handler(&self) -> DeleteAdminUserHandler {
        DeleteAdminUserHandler::new(self.repos.admin_users.clone())
    }

    pub fn list_events_handler(&self) -> ListEventsHandler {
        ListEventsHandler::new(self.repos.events.clone())
    }

    pub fn get_event_handler(&self) -> GetEventHandler {
        GetEventHandler::new(self.repos.events.clone())
    }

    pub fn create_event_handler(&self) -> CreateEventHandler {
        CreateEventHandler::new(self.repos.events.clone(), self.settings.currency.clone())
    }

    pub fn update_event_handler(&self) -> UpdateEventHandler {
        UpdateEventHandler::new(self.repos.events.clone(), self.settings.currency.clone())
    }

    pub fn publish_event_handler(&self) -> SetEventPublishedHandler {
        SetEventPublishedHandler::new(self.repos.events.clone())
    }

    pub fn delete_event_handler(&self) -> DeleteEventHandler {
        DeleteEventHandler::new(self.repos.events.clone())
    }

    pub fn event_rsvps_handler(&self) -> ListEventRsvpsHandler {
        ListEventRsvpsHandler::new(self.repos.events.clone(), self.repos.members.clone())
    }

    pub fn check_in_handler(&self) -> CheckInHandler {
        CheckInHandler::new(self.repos.events.clone())
    }

    pub fn upload_image_handler(&self) -> UploadImageHandler {
        UploadImageHandler::new(
            self.repos.gallery.clone(),
            self.blob_storage.clone(),
            self.settings.max_upload_bytes,
        )
    }

    pub fn update_image_handler(&self) -> UpdateImageHandler {
        UpdateImageHandler::new(self.repos.gallery.clone())
    }

    pub fn delete_image_handler(&self) -> DeleteImageHandler {
        DeleteImageHandler::new(self.repos.gallery.clone(), self.blob_storage.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.repos.payments.clone())
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.repos.payments.clone())
    }

    pub fn refund_handler(&self) -> RefundPaymentHandler {
        RefundPaymentHandler::new(
            self.repos.payments.clone(),
            self.payment_provider.clone(),
            self.repos.members.clone(),
            self.repos.events.clone(),
        )
    }

    pub fn create_referral_source_handler(&self) -> CreateReferralSourceHandler {
        CreateReferralSourceHandler::new(self.repos.referral_sources.clone())
    }

    pub fn update_referral_source_handler(&self) -> UpdateReferralSourceHandler {
        UpdateReferralSourceHandler::new(self.repos.referral_sources.clone())
    }

    pub fn delete_referral_source_handler(&self) -> DeleteReferralSourceHandler {
        DeleteReferralSourceHandler::new(self.repos.referral_sources.clone())
    }

    pub fn stats_handler(&self) -> GetMarketingStatsHandler {
        GetMarketingStatsHandler::new(
            self.repos.marketing.clone(),
            self.repos.members.clone(),
            self.repos.referral_sources.clone(),
            self.settings.currency.clone(),
        )
    }

    pub fn list_messages_handler(&self) -> ListContactMessagesHandler {
        ListContactMessagesHandler::new(self.repos.contact_messages.clone())
    }

    pub fn unread_messages_handler(&self) -> CountUnreadMessagesHandler {
        CountUnreadMessagesHandler::new(self.repos.contact_messages.clone())
    }

    pub fn mark_message_read_handler(&self) -> MarkMessageReadHandler {
        MarkMessageReadHandler::new(self.repos.contact_messages.clone())
    }

    pub fn delete_message_handler(&self) -> DeleteMessageHandler {
        DeleteMessageHandler::new(self.repos.contact_messages.clone())
    }
}
