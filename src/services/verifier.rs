use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::TicketError;
use super::window::{compute_expired, ensure_check_in_open};
use crate::models::{Ticket, TicketLookup, VerifyOutcome};
use crate::store::{EventStore, TicketStore};

/// Organizer-side check-in.
///
/// A ticket moves from unverified to verified once. The transition is a
/// conditional update in the store, so two scanners racing on the same
/// ticket produce one `Verified` and one `AlreadyVerified`.
pub struct TicketVerifier {
    events: Arc<dyn EventStore>,
    tickets: Arc<dyn TicketStore>,
}

impl TicketVerifier {
    pub fn new(events: Arc<dyn EventStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self { events, tickets }
    }

    pub async fn resolve_ticket(
        &self,
        lookup: &TicketLookup,
        event_id: Uuid,
    ) -> Result<Ticket, TicketError> {
        self.tickets
            .find_ticket(lookup, event_id)
            .await?
            .ok_or(TicketError::TicketNotFound)
    }

    pub async fn verify(
        &self,
        lookup: Option<TicketLookup>,
        event_id: Uuid,
        organizer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, TicketError> {
        let lookup = lookup.ok_or(TicketError::MissingIdentifier)?;
        let ticket = self.resolve_ticket(&lookup, event_id).await?;

        if ticket.organizer_id != organizer_id {
            return Err(TicketError::Forbidden(
                "Only the event organizer can verify this ticket".to_string(),
            ));
        }

        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or(TicketError::EventNotFound)?;

        ensure_check_in_open(&event, now)?;

        if ticket.checked_in {
            debug!(ticket_id = %ticket.id, "Ticket already verified");
            return Ok(VerifyOutcome::AlreadyVerified(ticket));
        }

        let expired = compute_expired(now, event.end_time);
        match self.tickets.mark_checked_in(ticket.id, now, expired).await? {
            Some(verified) => {
                info!(ticket_id = %verified.id, %event_id, "Ticket verified");
                Ok(VerifyOutcome::Verified(verified))
            }
            None => {
                // Lost the race to a concurrent scan.
                let current = self
                    .tickets
                    .get_ticket(ticket.id)
                    .await?
                    .ok_or(TicketError::TicketNotFound)?;
                Ok(VerifyOutcome::AlreadyVerified(current))
            }
        }
    }

    pub async fn tickets_for_event(
        &self,
        event_id: Uuid,
        organizer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketError> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or(TicketError::EventNotFound)?;

        if event.organizer_id != organizer_id {
            return Err(TicketError::Forbidden(
                "Only the event organizer can list tickets for this event".to_string(),
            ));
        }

        let tickets = self.tickets.tickets_for_event(event_id).await?;
        Ok(tickets
            .into_iter()
            .map(|ticket| ticket.with_expiry(now, event.end_time))
            .collect())
    }
}
