//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, roles, errors)
//! - `member` - Members and the membership status lifecycle
//! - `admin` - Back-office accounts
//! - `event` - Events, pricing tiers and RSVPs
//! - `gallery` - Gallery images and upload rules
//! - `payment` - Payments, refunds, receipts, webhook verification
//! - `marketing` - Referral sources and statistics
//! - `content` - Public site content and contact messages

pub mod admin;
pub mod content;
pub mod event;
pub mod foundation;
pub mod gallery;
pub mod marketing;
pub mod member;
pub mod payment;
