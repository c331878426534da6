//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence
//!
//! - `MemberRepository`, `AdminUserRepository`, `EventRepository`,
//!   `GalleryRepository`, `PaymentRepository`, `ReferralSourceRepository`,
//!   `ContactMessageRepository`
//! - `MarketingReader` - read model for statistics
//!
//! ## Integrations
//!
//! - `PaymentProvider` - Stripe Checkout, refunds, webhooks
//! - `BlobStorage` - gallery uploads
//! - `ReceiptRenderer` - PDF receipts
//!
//! ## Security
//!
//! - `PasswordHasher`, `TokenService`, `RateLimiter`

mod admin_user_repository;
mod blob_storage;
mod contact_message_repository;
mod event_repository;
mod gallery_repository;
mod marketing_reader;
mod member_repository;
mod pagination;
mod password_hasher;
mod payment_provider;
mod payment_repository;
mod rate_limiter;
mod receipt_renderer;
mod referral_source_repository;
mod token_service;

pub use admin_user_repository::AdminUserRepository;
pub use blob_storage::{BlobStorage, StorageError, StoredBlob};
pub use contact_message_repository::ContactMessageRepository;
pub use event_repository::EventRepository;
pub use gallery_repository::GalleryRepository;
pub use marketing_reader::MarketingReader;
pub use member_repository::{MemberFilter, MemberRepository};
pub use pagination::{Page, Paginated, PaginationQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use password_hasher::PasswordHasher;
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, CreateRefundRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, Refund, RefundReason, WebhookEvent, WebhookEventKind,
};
pub use payment_repository::{PaymentFilter, PaymentRepository};
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};
pub use receipt_renderer::{ReceiptRenderer, RenderError};
pub use referral_source_repository::ReferralSourceRepository;
pub use token_service::{IssuedToken, TokenService};
