//! Payments, refunds, receipts and Stripe webhook verification.
//!
//! - `aggregate` - Payment aggregate with refund arithmetic
//! - `status` - PaymentStatus state machine and PaymentPurpose
//! - `receipt` - Receipt data and Markdown rendering
//! - `webhook_verifier` - `Stripe-Signature` HMAC verification

mod aggregate;
mod receipt;
mod status;
mod webhook_verifier;

pub use aggregate::{Payment, RefundApplied};
pub use receipt::{Receipt, ReceiptRecipient};
pub use status::{PaymentPurpose, PaymentStatus};
pub use webhook_verifier::{
    SignatureHeader, StripeWebhookVerifier, WebhookError, MAX_CLOCK_SKEW_SECS, MAX_EVENT_AGE_SECS,
};
