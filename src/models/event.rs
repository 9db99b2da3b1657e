use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The slice of an event that booking and check-in depend on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub capacity: i32,
    pub tickets_sold: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Event {
    pub fn is_sold_out(&self) -> bool {
        self.tickets_sold >= self.capacity
    }
}

/// Result of recomputing an event's sold counter from its tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoldReconciliation {
    pub previous: i32,
    pub current: i32,
}
