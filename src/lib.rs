//! Clubhouse - membership club site backend
//!
//! Public pages, member signup with Stripe Checkout, event RSVPs with paid
//! tickets, a photo gallery and an admin back office with refunds, PDF
//! receipts and marketing statistics.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
