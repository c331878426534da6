//! Member reservations: free RSVPs, paid ticket checkout, cancellation.

use std::sync::Arc;

use crate::application::handlers::members::GetProfileHandler;
use crate::application::handlers::payments::{CheckoutRedirects, CheckoutStarted, CheckoutStarter};
use crate::application::ClubSettings;
use crate::domain::event::{Event, Rsvp};
use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, MemberId, PaymentId, RsvpId, Timestamp,
};
use crate::domain::payment::Payment;
use crate::ports::{EventRepository, MemberRepository};

use super::queries::load_event;

fn already_rsvped() -> DomainError {
    DomainError::new(
        ErrorCode::AlreadyRsvped,
        "You already have a reservation for this event",
    )
}

#[derive(Debug, Clone)]
pub struct RsvpCommand {
    pub event_id: EventId,
    pub member_id: MemberId,
    pub guests: u32,
}

#[derive(Debug, Clone)]
pub struct RsvpResult {
    pub rsvp: Rsvp,
    pub event: Event,
}

/// Reserves seats at a free event.
pub struct RsvpHandler {
    events: Arc<dyn EventRepository>,
}

impl RsvpHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, cmd: RsvpCommand) -> Result<RsvpResult, DomainError> {
        let event = load_event(self.events.as_ref(), &cmd.event_id).await?;
        event.ensure_accepting_rsvps(&Timestamp::now())?;

        let price = event.pricing.price_for(cmd.guests)?;
        if !price.is_zero() {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "This event requires payment; start a checkout instead",
            )
            .with_detail("field", "event_id")
            .with_detail("price", price.display()));
        }

        let rsvp = Rsvp::confirm(RsvpId::new(), event.id, cmd.member_id, cmd.guests, None)?;
        let event = self.events.reserve(&rsvp).await?;
        tracing::info!(
            event_id = %event.id,
            member_id = %cmd.member_id,
            seats = rsvp.seats(),
            rsvp_count = event.rsvp_count,
            "RSVP confirmed"
        );
        Ok(RsvpResult { rsvp, event })
    }
}

#[derive(Debug, Clone)]
pub struct CancelRsvpCommand {
    pub event_id: EventId,
    pub member_id: MemberId,
}

/// Cancels a free reservation. Paid reservations are undone by a refund.
pub struct CancelRsvpHandler {
    events: Arc<dyn EventRepository>,
}

impl CancelRsvpHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, cmd: CancelRsvpCommand) -> Result<Event, DomainError> {
        let rsvp = self
            .events
            .find_confirmed_rsvp(&cmd.event_id, &cmd.member_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::RsvpNotFound, "Reservation not found"))?;
        if rsvp.payment_id.is_some() {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Paid reservations are cancelled through a refund; please contact the club",
            ));
        }

        let event = self.events.cancel_rsvp(&rsvp.id).await?;
        tracing::info!(
            event_id = %event.id,
            member_id = %cmd.member_id,
            rsvp_count = event.rsvp_count,
            "RSVP cancelled"
        );
        Ok(event)
    }
}

#[derive(Debug, Clone)]
pub struct StartEventCheckoutCommand {
    pub event_id: EventId,
    pub member_id: MemberId,
    pub guests: u32,
}

/// Opens a Stripe checkout for a paid event. Seats are reserved when the
/// webhook confirms payment.
pub struct StartEventCheckoutHandler {
    events: Arc<dyn EventRepository>,
    profile: GetProfileHandler,
    checkout: CheckoutStarter,
    settings: ClubSettings,
}

impl StartEventCheckoutHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        members: Arc<dyn MemberRepository>,
        checkout: CheckoutStarter,
        settings: ClubSettings,
    ) -> Self {
        Self {
            events,
            profile: GetProfileHandler::new(members),
            checkout,
            settings,
        }
    }

    pub async fn handle(&self, cmd: StartEventCheckoutCommand) -> Result<CheckoutStarted, DomainError> {
        let member = self.profile.handle(cmd.member_id).await?;
        let event = load_event(self.events.as_ref(), &cmd.event_id).await?;
        event.ensure_accepting_rsvps(&Timestamp::now())?;

        if self
            .events
            .find_confirmed_rsvp(&event.id, &member.id)
            .await?
            .is_some()
        {
            return Err(already_rsvped());
        }
        event.ensure_seats(1 + cmd.guests)?;

        let price = event.pricing.price_for(cmd.guests)?;
        if price.is_zero() {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "This event is free; RSVP directly",
            )
            .with_detail("field", "event_id"));
        }

        let description = match cmd.guests {
            0 => format!("{} ticket", event.title),
            n => format!("{} ticket (+{} guests)", event.title, n),
        };
        let payment = Payment::event_ticket(
            PaymentId::new(),
            member.id,
            event.id,
            price,
            description,
            cmd.guests,
        );
        let path = format!("/events/{}", event.id);
        self.checkout
            .start(
                payment,
                &member,
                &event.title,
                CheckoutRedirects {
                    success_url: self.settings.success_url(&format!("{}/success", path)),
                    cancel_url: self.settings.cancel_url(&path),
                },
            )
            .await
    }
}

/// A reservation with its event, for the member's own listing.
#[derive(Debug, Clone)]
pub struct MemberRsvp {
    pub rsvp: Rsvp,
    pub event: Event,
}

pub struct ListMemberRsvpsHandler {
    events: Arc<dyn EventRepository>,
}

impl ListMemberRsvpsHandler {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, member_id: MemberId) -> Result<Vec<MemberRsvp>, DomainError> {
        let rsvps = self.events.list_rsvps_for_member(&member_id).await?;
        let mut listed = Vec::with_capacity(rsvps.len());
        for rsvp in rsvps {
            if let Some(event) = self.events.find_by_id(&rsvp.event_id).await? {
                listed.push(MemberRsvp { rsvp, event });
            }
        }
        listed.sort_by(|a, b| a.event.starts_at.cmp(&b.event.starts_at));
        Ok(listed)
    }
}
