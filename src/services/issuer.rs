//! Ticket issuance and cancellation.
//!
//! The store offers atomic single-record operations only, so a booking is
//! two writes: insert the ticket, then bump the event's sold counter with a
//! capacity guard. If the guarded bump is rejected the ticket is deleted
//! again. A crash between the two writes leaves the counter one behind;
//! `reconcile_sold` repairs that from the actual ticket count.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::code::generate_code;
use super::error::TicketError;
use super::visual_code::VisualCodeEncoder;
use super::window::{compute_expired, ensure_booking_open};
use crate::models::{Event, SoldReconciliation, Ticket};
use crate::store::{EventStore, StoreError, TicketStore, UserDirectory};

pub const DEFAULT_CODE_ATTEMPTS: usize = 5;

pub struct TicketIssuer {
    events: Arc<dyn EventStore>,
    tickets: Arc<dyn TicketStore>,
    users: Arc<dyn UserDirectory>,
    encoder: Arc<dyn VisualCodeEncoder>,
    code_attempts: usize,
}

impl TicketIssuer {
    pub fn new(
        events: Arc<dyn EventStore>,
        tickets: Arc<dyn TicketStore>,
        users: Arc<dyn UserDirectory>,
        encoder: Arc<dyn VisualCodeEncoder>,
    ) -> Self {
        Self {
            events,
            tickets,
            users,
            encoder,
            code_attempts: DEFAULT_CODE_ATTEMPTS,
        }
    }

    pub fn with_code_attempts(mut self, attempts: usize) -> Self {
        self.code_attempts = attempts.max(1);
        self
    }

    pub async fn book_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Ticket, TicketError> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or(TicketError::EventNotFound)?;

        ensure_booking_open(&event, now)?;

        if self.tickets.ticket_exists_for(user_id, event_id).await? {
            return Err(TicketError::AlreadyBooked);
        }
        if event.is_sold_out() {
            return Err(TicketError::SoldOut);
        }

        let user_name = self
            .users
            .display_name(user_id)
            .await
            .map_err(|e| TicketError::Directory(e.to_string()))?
            .ok_or_else(|| TicketError::Directory(format!("no entry for user {user_id}")))?;

        let ticket = self.insert_with_unique_code(&event, user_id, user_name, now).await?;

        match self.events.adjust_sold(event_id, 1).await {
            Ok(Some(sold)) => {
                info!(
                    ticket_id = %ticket.id,
                    %event_id,
                    %user_id,
                    tickets_sold = sold,
                    "Ticket booked"
                );
                Ok(ticket)
            }
            Ok(None) => {
                warn!(ticket_id = %ticket.id, %event_id, "Capacity reached after insert, releasing ticket");
                self.release(&ticket).await;
                Err(TicketError::SoldOut)
            }
            Err(e) => {
                warn!(ticket_id = %ticket.id, %event_id, error = %e, "Sold counter update failed, releasing ticket");
                self.release(&ticket).await;
                Err(e.into())
            }
        }
    }

    /// Inserts the ticket, drawing fresh codes until one is accepted.
    ///
    /// `code_exists` is only a pre-filter; the store's unique constraint
    /// decides. Both kinds of collision consume an attempt.
    async fn insert_with_unique_code(
        &self,
        event: &Event,
        user_id: Uuid,
        user_name: String,
        now: DateTime<Utc>,
    ) -> Result<Ticket, TicketError> {
        let id = Uuid::new_v4();
        let qr_code = self.encoder.encode(&id.to_string())?;

        for attempt in 1..=self.code_attempts {
            let code = generate_code();
            if self.tickets.code_exists(&code).await? {
                continue;
            }

            let ticket = Ticket {
                id,
                user_id,
                event_id: event.id,
                organizer_id: event.organizer_id,
                user_name: user_name.clone(),
                code,
                qr_code: qr_code.clone(),
                checked_in: false,
                checked_in_at: None,
                expired: compute_expired(now, event.end_time),
                created_at: now,
            };

            match self.tickets.insert_ticket(&ticket).await {
                Ok(inserted) => return Ok(inserted),
                Err(StoreError::DuplicateCode) => {
                    warn!(attempt, "Ticket code collided on insert");
                }
                Err(StoreError::DuplicateBooking) => return Err(TicketError::AlreadyBooked),
                Err(e) => return Err(e.into()),
            }
        }

        Err(TicketError::CodeGenerationExhausted)
    }

    async fn release(&self, ticket: &Ticket) {
        if let Err(e) = self.tickets.delete_ticket(ticket.id).await {
            error!(
                ticket_id = %ticket.id,
                event_id = %ticket.event_id,
                error = %e,
                "Failed to release ticket; event needs reconciliation"
            );
        }
    }

    /// Deletes a ticket owned by `user_id` and decrements the sold counter.
    pub async fn cancel(&self, ticket_id: Uuid, user_id: Uuid) -> Result<(), TicketError> {
        let ticket = self
            .tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or(TicketError::TicketNotFound)?;

        if ticket.user_id != user_id {
            return Err(TicketError::Forbidden(
                "Unauthorized to cancel this ticket".to_string(),
            ));
        }

        if !self.tickets.delete_ticket(ticket_id).await? {
            return Err(TicketError::TicketNotFound);
        }

        if let Err(e) = self.events.adjust_sold(ticket.event_id, -1).await {
            error!(
                %ticket_id,
                event_id = %ticket.event_id,
                error = %e,
                "Ticket deleted but sold counter not decremented; event needs reconciliation"
            );
            return Err(e.into());
        }

        info!(%ticket_id, event_id = %ticket.event_id, %user_id, "Ticket cancelled");
        Ok(())
    }

    pub async fn tickets_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketError> {
        let tickets = self.tickets.tickets_for_user(user_id).await?;
        Ok(tickets
            .into_iter()
            .map(|(ticket, event_end)| ticket.with_expiry(now, event_end))
            .collect())
    }

    /// Resets the sold counter to the number of tickets that exist.
    pub async fn reconcile_sold(
        &self,
        event_id: Uuid,
        organizer_id: Uuid,
    ) -> Result<SoldReconciliation, TicketError> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or(TicketError::EventNotFound)?;

        if event.organizer_id != organizer_id {
            return Err(TicketError::Forbidden(
                "Only the event organizer can reconcile ticket sales".to_string(),
            ));
        }

        let result = self
            .events
            .reconcile_sold(event_id)
            .await?
            .ok_or(TicketError::EventNotFound)?;

        if result.previous != result.current {
            warn!(
                %event_id,
                previous = result.previous,
                current = result.current,
                "Sold counter drift corrected"
            );
        }

        Ok(result)
    }
}
