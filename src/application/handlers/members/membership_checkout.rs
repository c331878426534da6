//! StartMembershipCheckoutHandler - Membership fee checkout for first-time
//! payment and renewals.

use std::sync::Arc;

use crate::application::handlers::payments::{CheckoutRedirects, CheckoutStarted, CheckoutStarter};
use crate::application::ClubSettings;
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, PaymentId, Timestamp};
use crate::domain::payment::Payment;
use crate::ports::MemberRepository;

use super::profile::load_current;

pub struct StartMembershipCheckoutHandler {
    members: Arc<dyn MemberRepository>,
    checkout: CheckoutStarter,
    settings: ClubSettings,
}

impl StartMembershipCheckoutHandler {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        checkout: CheckoutStarter,
        settings: ClubSettings,
    ) -> Self {
        Self {
            members,
            checkout,
            settings,
        }
    }

    pub async fn handle(&self, member_id: MemberId) -> Result<CheckoutStarted, DomainError> {
        let member = load_current(self.members.as_ref(), &member_id).await?;

        if !member.can_start_membership_checkout(&Timestamp::now(), self.settings.renewal_window_days)
        {
            let mut err = DomainError::new(
                ErrorCode::MembershipActive,
                format!(
                    "Membership is active; renewal opens {} days before expiry",
                    self.settings.renewal_window_days
                ),
            );
            if let Some(expires) = member.membership_expires_at {
                err = err.with_detail("membership_expires_at", expires.as_datetime().to_rfc3339());
            }
            return Err(err);
        }

        let product = format!("{} membership", self.settings.club_name);
        let payment = Payment::membership(
            PaymentId::new(),
            member.id,
            self.settings.membership_fee()?,
            product.clone(),
        );
        self.checkout
            .start(
                payment,
                &member,
                &product,
                CheckoutRedirects {
                    success_url: self.settings.success_url("/membership/success"),
                    cancel_url: self.settings.cancel_url("/membership"),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::test_support;
    use crate::domain::member::MembershipStatus;

    fn handler(store: &InMemoryStore) -> StartMembershipCheckoutHandler {
        StartMembershipCheckoutHandler::new(
            Arc::new(store.clone()),
            CheckoutStarter::new(Arc::new(store.clone()), Arc::new(MockPaymentProvider::new())),
            ClubSettings::for_tests(),
        )
    }

    #[tokio::test]
    async fn pending_member_can_pay() {
        let store = InMemoryStore::new();
        let member = test_support::member(&store, "ada@example.org").await;
        let started = handler(&store).handle(member.id).await.unwrap();
        assert_eq!(started.payment.member_id, Some(member.id));
        assert_eq!(started.payment.description, "Test Club membership");
    }

    #[tokio::test]
    async fn active_member_far_from_expiry_is_refused() {
        let store = InMemoryStore::new();
        let member = test_support::active_member(&store, "ada@example.org").await;
        let err = handler(&store).handle(member.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MembershipActive);
    }

    #[tokio::test]
    async fn renewal_window_allows_checkout() {
        let store = InMemoryStore::new();
        let mut member = test_support::member(&store, "ada@example.org").await;
        member
            .set_status(MembershipStatus::Active, Some(Timestamp::now().add_days(10)))
            .unwrap();
        MemberRepository::update(&store, &member).await.unwrap();

        assert!(handler(&store).handle(member.id).await.is_ok());
    }
}
