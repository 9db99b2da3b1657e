//! Store boundary.
//!
//! Every method maps to one atomic single-record operation. Nothing here
//! spans two records in a transaction: the ticket write and the sold
//! counter write are always separate calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, SoldReconciliation, Ticket, TicketLookup};

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

pub const USER_EVENT_CONSTRAINT: &str = "tickets_user_event_key";
pub const CODE_CONSTRAINT: &str = "tickets_code_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a ticket already exists for this user and event")]
    DuplicateBooking,

    #[error("ticket code already in use")]
    DuplicateCode,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some(USER_EVENT_CONSTRAINT) => return StoreError::DuplicateBooking,
                    Some(CODE_CONSTRAINT) => return StoreError::DuplicateCode,
                    _ => {}
                }
            }
        }
        StoreError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Applies `delta` to the sold counter in one conditional update.
    ///
    /// Increments only apply while the result stays within capacity;
    /// decrements floor at zero. Returns the new value, or `None` when the
    /// guard rejected the change or the event is gone.
    async fn adjust_sold(&self, event_id: Uuid, delta: i32) -> Result<Option<i32>, StoreError>;

    /// Recomputes the sold counter from the tickets that reference the event.
    async fn reconcile_sold(&self, event_id: Uuid)
        -> Result<Option<SoldReconciliation>, StoreError>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Inserts a ticket. The store's uniqueness constraints are the
    /// authority: violations surface as `DuplicateBooking` or `DuplicateCode`.
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError>;

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn find_ticket(
        &self,
        lookup: &TicketLookup,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError>;

    async fn ticket_exists_for(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, StoreError>;

    async fn code_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Sets `checked_in` only if it is still false. `None` means another
    /// caller got there first (or the ticket vanished).
    async fn mark_checked_in(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
        expired: bool,
    ) -> Result<Option<Ticket>, StoreError>;

    /// Returns whether a row was actually removed.
    async fn delete_ticket(&self, ticket_id: Uuid) -> Result<bool, StoreError>;

    async fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError>;

    /// Tickets owned by `user_id`, paired with the end time of their event.
    async fn tickets_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Ticket, DateTime<Utc>)>, StoreError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, StoreError>;
}
