//! Event handlers.
//!
//! ## Commands
//! - RSVP to a free event, cancel it
//! - Start a ticket checkout for a paid event
//! - Back office: create, update, publish, delete, check in
//!
//! ## Queries
//! - Upcoming published events and a single published event
//! - Own reservations
//! - Back office: event list, event, attendee list

mod manage;
mod queries;
mod rsvp;

pub use manage::{
    CheckInCommand, CheckInHandler, CheckInResult, CreateEventHandler, DeleteEventHandler,
    EventAttendee, EventInput, ListEventRsvpsHandler, SetEventPublishedCommand,
    SetEventPublishedHandler, UpdateEventCommand, UpdateEventHandler,
};
pub use queries::{
    GetEventHandler, GetPublishedEventHandler, ListEventsHandler, ListUpcomingEventsHandler,
};
pub use rsvp::{
    CancelRsvpCommand, CancelRsvpHandler, ListMemberRsvpsHandler, MemberRsvp, RsvpCommand,
    RsvpHandler, RsvpResult, StartEventCheckoutCommand, StartEventCheckoutHandler,
};
