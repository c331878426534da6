//! Payment receipts.
//!
//! A receipt is assembled from a paid payment and rendered to Markdown; the
//! receipt renderer port turns the Markdown into PDF bytes.

use serde::Serialize;

use crate::domain::foundation::{format_cents, DomainError, ErrorCode, Timestamp};

use super::{Payment, PaymentPurpose, PaymentStatus};

/// Data printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub number: String,
    pub club_name: String,
    pub issued_to_name: Option<String>,
    pub issued_to_email: Option<String>,
    pub paid_on: String,
    pub description: String,
    pub purpose: PaymentPurpose,
    pub status: PaymentStatus,
    pub guests: u32,
    pub amount: String,
    pub refunded: Option<String>,
    pub net: String,
    pub payment_reference: String,
}

/// Who the receipt is issued to.
#[derive(Debug, Clone, Default)]
pub struct ReceiptRecipient {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Receipt {
    /// Builds the receipt for a paid payment.
    pub fn for_payment(
        payment: &Payment,
        recipient: ReceiptRecipient,
        club_name: &str,
    ) -> Result<Self, DomainError> {
        if !payment.has_receipt() {
            return Err(DomainError::new(
                ErrorCode::ReceiptUnavailable,
                "Receipts are only available for completed payments",
            )
            .with_detail("status", payment.status.as_str()));
        }
        let paid_at = payment.paid_at.unwrap_or(payment.created_at);
        let currency = payment.amount.currency();
        let refunded = (payment.refunded_cents > 0)
            .then(|| format_cents(payment.refunded_cents, currency));

        Ok(Self {
            number: receipt_number(payment, &paid_at),
            club_name: club_name.to_string(),
            issued_to_name: recipient.name,
            issued_to_email: recipient.email,
            paid_on: paid_at.date_string(),
            description: payment.description.clone(),
            purpose: payment.purpose,
            status: payment.status,
            guests: payment.guests,
            amount: payment.amount.display(),
            refunded,
            net: format_cents(payment.net_cents(), currency),
            payment_reference: payment
                .payment_intent_id
                .clone()
                .unwrap_or_else(|| payment.id.to_string()),
        })
    }

    /// File name offered for download.
    pub fn file_name(&self) -> String {
        format!("receipt-{}.pdf", self.number)
    }

    /// Markdown source of the receipt.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("# {}\n\n", escape_md(&self.club_name)));
        md.push_str(&format!("## Receipt {}\n\n", self.number));

        md.push_str(&format!("**Date:** {}\n\n", self.paid_on));
        if let Some(name) = &self.issued_to_name {
            md.push_str(&format!("**Billed to:** {}", escape_md(name)));
            if let Some(email) = &self.issued_to_email {
                md.push_str(&format!(" ({})", escape_md(email)));
            }
            md.push_str("\n\n");
        } else if let Some(email) = &self.issued_to_email {
            md.push_str(&format!("**Billed to:** {}\n\n", escape_md(email)));
        }

        md.push_str("| Item | Amount |\n|---|---:|\n");
        let item = match self.purpose {
            PaymentPurpose::EventTicket if self.guests > 0 => format!(
                "{} (member + {} guest{})",
                escape_md(&self.description),
                self.guests,
                if self.guests == 1 { "" } else { "s" }
            ),
            _ => escape_md(&self.description),
        };
        md.push_str(&format!("| {} | {} |\n", item, self.amount));
        if let Some(refunded) = &self.refunded {
            md.push_str(&format!("| Refunded | -{} |\n", refunded));
        }
        md.push_str(&format!("| **Total paid** | **{}** |\n\n", self.net));

        md.push_str(&format!("Status: {}\n\n", status_label(self.status)));
        md.push_str(&format!("Payment reference: `{}`\n", self.payment_reference));
        md
    }
}

fn receipt_number(payment: &Payment, paid_at: &Timestamp) -> String {
    let id = payment.id.to_string();
    let short: String = id.chars().filter(|c| *c != '-').take(8).collect();
    format!(
        "R-{}-{}",
        paid_at.as_datetime().format("%Y%m%d"),
        short.to_ascii_uppercase()
    )
}

fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Succeeded => "Paid",
        PaymentStatus::PartiallyRefunded => "Paid, partially refunded",
        PaymentStatus::Refunded => "Refunded",
        PaymentStatus::Pending => "Pending",
        PaymentStatus::Failed => "Failed",
        PaymentStatus::Expired => "Expired",
    }
}

fn escape_md(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '|' | '#' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, MemberId, Money, PaymentId};

    fn paid_ticket() -> Payment {
        let mut payment = Payment::event_ticket(
            PaymentId::new(),
            MemberId::new(),
            EventId::new(),
            Money::new(6500, "usd").unwrap(),
            "Summer Social",
            3,
        );
        let paid_at = Timestamp::from_unix_secs(1_709_596_800).unwrap();
        payment.mark_succeeded(Some("pi_123".into()), paid_at).unwrap();
        payment
    }

    fn recipient() -> ReceiptRecipient {
        ReceiptRecipient {
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.org".into()),
        }
    }

    #[test]
    fn pending_payment_has_no_receipt() {
        let payment = Payment::membership(
            PaymentId::new(),
            MemberId::new(),
            Money::new(100, "usd").unwrap(),
            "Membership",
        );
        let err = Receipt::for_payment(&payment, recipient(), "Club").unwrap_err();
        assert_eq!(err.code, ErrorCode::ReceiptUnavailable);
    }

    #[test]
    fn receipt_number_uses_paid_date_and_id() {
        let payment = paid_ticket();
        let receipt = Receipt::for_payment(&payment, recipient(), "Club").unwrap();
        assert!(receipt.number.starts_with("R-20240305-"));
        assert_eq!(receipt.number.len(), "R-20240305-".len() + 8);
        assert_eq!(receipt.file_name(), format!("receipt-{}.pdf", receipt.number));
    }

    #[test]
    fn markdown_lists_amounts_and_guests() {
        let payment = paid_ticket();
        let md = Receipt::for_payment(&payment, recipient(), "Harbor Club")
            .unwrap()
            .to_markdown();
        assert!(md.contains("# Harbor Club"));
        assert!(md.contains("Summer Social (member + 3 guests)"));
        assert!(md.contains("65.00 USD"));
        assert!(md.contains("Payment reference: `pi_123`"));
        assert!(!md.contains("Refunded |"));
    }

    #[test]
    fn markdown_shows_refunds() {
        let mut payment = paid_ticket();
        payment.apply_refund(1500).unwrap();
        let receipt = Receipt::for_payment(&payment, recipient(), "Club").unwrap();
        let md = receipt.to_markdown();
        assert!(md.contains("| Refunded | -15.00 USD |"));
        assert!(md.contains("**50.00 USD**"));
        assert!(md.contains("partially refunded"));
    }

    #[test]
    fn markdown_escapes_user_text() {
        assert_eq!(escape_md("a|b*c"), "a\\|b\\*c");
    }
}
