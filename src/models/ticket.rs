use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::window::compute_expired;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub organizer_id: Uuid,
    pub user_name: String,
    /// Scanner-readable code, unique across all tickets.
    pub code: String,
    /// Data URI of the QR image encoding `id`.
    pub qr_code: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Refreshes the derived `expired` flag against the event end.
    pub fn with_expiry(mut self, now: DateTime<Utc>, event_end: DateTime<Utc>) -> Self {
        self.expired = compute_expired(now, event_end);
        self
    }
}

/// How a caller identifies the ticket being verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketLookup {
    ById(Uuid),
    ByCode(String),
}

impl TicketLookup {
    /// Picks the lookup from optional request fields. The code wins when
    /// both are present, matching what scanners send.
    pub fn from_parts(ticket_id: Option<Uuid>, code: Option<String>) -> Option<Self> {
        match (code.filter(|c| !c.trim().is_empty()), ticket_id) {
            (Some(code), _) => Some(Self::ByCode(code.trim().to_string())),
            (None, Some(id)) => Some(Self::ById(id)),
            (None, None) => None,
        }
    }
}

/// Outcome of a successful verification call.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Verified(Ticket),
    AlreadyVerified(Ticket),
}

impl VerifyOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            VerifyOutcome::Verified(_) => "success",
            VerifyOutcome::AlreadyVerified(_) => "already_verified",
        }
    }

    pub fn ticket(&self) -> &Ticket {
        match self {
            VerifyOutcome::Verified(ticket) | VerifyOutcome::AlreadyVerified(ticket) => ticket,
        }
    }

    pub fn into_ticket(self) -> Ticket {
        match self {
            VerifyOutcome::Verified(ticket) | VerifyOutcome::AlreadyVerified(ticket) => ticket,
        }
    }
}
