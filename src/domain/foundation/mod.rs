//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the club domain.

mod auth;
mod email;
mod errors;
mod ids;
mod money;
mod state_machine;
mod text;
mod timestamp;

pub use auth::{AdminRole, AuthError, Permission, Principal};
pub use email::Email;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    AdminUserId, ContactMessageId, EventId, GalleryImageId, MemberId, PaymentId,
    ReferralSourceId, RsvpId,
};
pub use money::{format_cents, Money};
pub use state_machine::StateMachine;
pub use text::{optional_text, required_text};
pub use timestamp::Timestamp;
