//! Time-window policy for booking and check-in.
//!
//! Every comparison is between raw UTC instants. No civil time zone is
//! applied anywhere, so booking close, check-in and expiry all agree.

use chrono::{DateTime, Utc};

use super::error::TicketError;
use crate::models::Event;

pub fn compute_expired(now: DateTime<Utc>, event_end: DateTime<Utc>) -> bool {
    now > event_end
}

/// Sales close at the event start. Events always end after they start, so
/// this also keeps sales closed once the event is over.
pub fn ensure_booking_open(event: &Event, now: DateTime<Utc>) -> Result<(), TicketError> {
    if now >= event.start_time {
        return Err(TicketError::SalesClosed);
    }
    Ok(())
}

/// Check-in is allowed on the closed interval `[start_time, end_time]`.
pub fn ensure_check_in_open(event: &Event, now: DateTime<Utc>) -> Result<(), TicketError> {
    if now < event.start_time {
        return Err(TicketError::EventNotStarted);
    }
    if compute_expired(now, event.end_time) {
        return Err(TicketError::EventEnded);
    }
    Ok(())
}
