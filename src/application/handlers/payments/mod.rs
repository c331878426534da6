//! Payment handlers.
//!
//! ## Commands
//! - Starting Stripe Checkout (shared by membership and ticket flows)
//! - Processing Stripe webhooks
//! - Issuing refunds
//!
//! ## Queries
//! - Listing and fetching payments
//! - Rendering PDF receipts

mod checkout;
mod handle_stripe_webhook;
mod queries;
mod refund_effects;
mod refund_payment;
mod render_receipt;

pub use checkout::{CheckoutRedirects, CheckoutStarted, CheckoutStarter};
pub use handle_stripe_webhook::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, HandleStripeWebhookResult,
};
pub use refund_effects::RefundEffects;
pub use refund_payment::{RefundPaymentCommand, RefundPaymentHandler, RefundPaymentResult};

// Queries
pub use queries::{
    GetPaymentHandler, ListMemberPaymentsHandler, ListPaymentsHandler, ListPaymentsQuery,
};
pub use render_receipt::{
    ReceiptRequester, RenderReceiptHandler, RenderReceiptQuery, RenderedReceipt,
};
