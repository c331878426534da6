//! RenderReceiptHandler - PDF receipt for a completed payment.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, PaymentId};
use crate::domain::payment::{Receipt, ReceiptRecipient};
use crate::ports::{MemberRepository, PaymentRepository, ReceiptRenderer};

/// Who is asking. Members only see receipts for their own payments.
#[derive(Debug, Clone, Copy)]
pub enum ReceiptRequester {
    Member(MemberId),
    BackOffice,
}

#[derive(Debug, Clone)]
pub struct RenderReceiptQuery {
    pub payment_id: PaymentId,
    pub requester: ReceiptRequester,
}

#[derive(Debug, Clone)]
pub struct RenderedReceipt {
    pub file_name: String,
    pub pdf: Vec<u8>,
}

pub struct RenderReceiptHandler {
    payments: Arc<dyn PaymentRepository>,
    members: Arc<dyn MemberRepository>,
    renderer: Arc<dyn ReceiptRenderer>,
    club_name: String,
}

impl RenderReceiptHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        members: Arc<dyn MemberRepository>,
        renderer: Arc<dyn ReceiptRenderer>,
        club_name: impl Into<String>,
    ) -> Self {
        Self {
            payments,
            members,
            renderer,
            club_name: club_name.into(),
        }
    }

    pub async fn handle(&self, query: RenderReceiptQuery) -> Result<RenderedReceipt, DomainError> {
        let not_found = || DomainError::new(ErrorCode::PaymentNotFound, "Payment not found");

        let payment = self
            .payments
            .find_by_id(&query.payment_id)
            .await?
            .ok_or_else(not_found)?;

        if let ReceiptRequester::Member(member_id) = query.requester {
            if payment.member_id != Some(member_id) {
                return Err(not_found());
            }
        }

        let recipient = match payment.member_id {
            Some(member_id) => match self.members.find_by_id(&member_id).await? {
                Some(member) => ReceiptRecipient {
                    name: Some(member.full_name()),
                    email: Some(member.email.as_str().to_string()),
                },
                None => ReceiptRecipient::default(),
            },
            None => ReceiptRecipient::default(),
        };

        let receipt = Receipt::for_payment(&payment, recipient, &self.club_name)?;
        let pdf = self.renderer.render_pdf(&receipt).await.map_err(|e| {
            tracing::error!(payment_id = %payment.id, error = %e, "Receipt rendering failed");
            DomainError::from(e)
        })?;

        tracing::debug!(payment_id = %payment.id, receipt = %receipt.number, bytes = pdf.len(), "Receipt rendered");
        Ok(RenderedReceipt {
            file_name: receipt.file_name(),
            pdf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::receipt::BuiltinPdfRenderer;
    use crate::domain::foundation::{Money, Timestamp};
    use crate::domain::member::{Member, NewMember};
    use crate::domain::payment::Payment;

    async fn setup(paid: bool) -> (InMemoryStore, RenderReceiptHandler, Member, Payment) {
        let store = InMemoryStore::new();
        let member = Member::sign_up(
            MemberId::new(),
            NewMember::parse("ada@example.org", "Ada", "Lovelace", None, None).unwrap(),
            "hash".into(),
        );
        MemberRepository::save(&store, &member).await.unwrap();
        let mut payment = Payment::membership(
            PaymentId::new(),
            member.id,
            Money::new(5_000, "usd").unwrap(),
            "Annual membership",
        );
        if paid {
            payment.mark_succeeded(Some("pi_1".into()), Timestamp::now()).unwrap();
        }
        PaymentRepository::save(&store, &payment).await.unwrap();
        let handler = RenderReceiptHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(BuiltinPdfRenderer::new()),
            "Test Club",
        );
        (store, handler, member, payment)
    }

    #[tokio::test]
    async fn owner_gets_a_pdf() {
        let (_store, handler, member, payment) = setup(true).await;
        let receipt = handler
            .handle(RenderReceiptQuery {
                payment_id: payment.id,
                requester: ReceiptRequester::Member(member.id),
            })
            .await
            .unwrap();
        assert!(receipt.pdf.starts_with(b"%PDF-"));
        assert!(receipt.file_name.starts_with("receipt-"));
        assert!(receipt.file_name.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn other_members_cannot_see_it() {
        let (_store, handler, _member, payment) = setup(true).await;
        let err = handler
            .handle(RenderReceiptQuery {
                payment_id: payment.id,
                requester: ReceiptRequester::Member(MemberId::new()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentNotFound);
    }

    #[tokio::test]
    async fn pending_payment_has_no_receipt() {
        let (_store, handler, _member, payment) = setup(false).await;
        let err = handler
            .handle(RenderReceiptQuery {
                payment_id: payment.id,
                requester: ReceiptRequester::BackOffice,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ReceiptUnavailable);
    }
}
