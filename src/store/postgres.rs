use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{EventStore, StoreError, TicketStore, UserDirectory};
use crate::models::{Event, SoldReconciliation, Ticket, TicketLookup, User};

const TICKET_COLUMNS: &str = "id, user_id, event_id, organizer_id, user_name, code, qr_code, \
     checked_in, checked_in_at, expired, created_at";

#[derive(FromRow)]
struct TicketWithEventEnd {
    #[sqlx(flatten)]
    ticket: Ticket,
    event_end: DateTime<Utc>,
}

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, organizer_id, capacity, tickets_sold, start_time, end_time \
             FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn adjust_sold(&self, event_id: Uuid, delta: i32) -> Result<Option<i32>, StoreError> {
        let sold = sqlx::query_scalar::<_, i32>(
            "UPDATE events SET tickets_sold = GREATEST(tickets_sold + $2, 0) \
             WHERE id = $1 AND tickets_sold + $2 <= capacity \
             RETURNING tickets_sold",
        )
        .bind(event_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sold)
    }

    async fn reconcile_sold(
        &self,
        event_id: Uuid,
    ) -> Result<Option<SoldReconciliation>, StoreError> {
        let row = sqlx::query_as::<_, (i32, i32)>(
            "UPDATE events e SET tickets_sold = LEAST(c.active, e.capacity) \
             FROM (SELECT COUNT(*)::INTEGER AS active FROM tickets WHERE event_id = $1) c, \
                  (SELECT tickets_sold AS previous FROM events WHERE id = $1) p \
             WHERE e.id = $1 \
             RETURNING p.previous, e.tickets_sold",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(previous, current)| SoldReconciliation { previous, current }))
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let query = format!(
            "INSERT INTO tickets ({TICKET_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {TICKET_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket.id)
            .bind(ticket.user_id)
            .bind(ticket.event_id)
            .bind(ticket.organizer_id)
            .bind(&ticket.user_name)
            .bind(&ticket.code)
            .bind(&ticket.qr_code)
            .bind(ticket.checked_in)
            .bind(ticket.checked_in_at)
            .bind(ticket.expired)
            .bind(ticket.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    async fn find_ticket(
        &self,
        lookup: &TicketLookup,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let ticket = match lookup {
            TicketLookup::ById(id) => {
                let query =
                    format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1 AND event_id = $2");
                sqlx::query_as::<_, Ticket>(&query)
                    .bind(id)
                    .bind(event_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            TicketLookup::ByCode(code) => {
                let query = format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets WHERE code = $1 AND event_id = $2"
                );
                sqlx::query_as::<_, Ticket>(&query)
                    .bind(code)
                    .bind(event_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(ticket)
    }

    async fn ticket_exists_for(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tickets WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn mark_checked_in(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
        expired: bool,
    ) -> Result<Option<Ticket>, StoreError> {
        let query = format!(
            "UPDATE tickets SET checked_in = TRUE, checked_in_at = $2, expired = $3 \
             WHERE id = $1 AND checked_in = FALSE \
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .bind(at)
            .bind(expired)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    async fn delete_ticket(&self, ticket_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE event_id = $1 ORDER BY created_at"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&query)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tickets)
    }

    async fn tickets_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Ticket, DateTime<Utc>)>, StoreError> {
        let rows = sqlx::query_as::<_, TicketWithEventEnd>(
            "SELECT t.id, t.user_id, t.event_id, t.organizer_id, t.user_name, t.code, t.qr_code, \
                    t.checked_in, t.checked_in_at, t.expired, t.created_at, \
                    e.end_time AS event_end \
             FROM tickets t JOIN events e ON e.id = t.event_id \
             WHERE t.user_id = $1 ORDER BY t.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.ticket, row.event_end))
            .collect())
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(|u| u.name))
    }
}
