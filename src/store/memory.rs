//! In-memory store used by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{EventStore, StoreError, TicketStore, UserDirectory};
use crate::auth::IdentityProvider;
use crate::models::{Event, SoldReconciliation, Ticket, TicketLookup};

#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<HashMap<Uuid, Event>>,
    tickets: Mutex<HashMap<Uuid, Ticket>>,
    users: Mutex<HashMap<Uuid, String>>,
    sessions: Mutex<HashMap<String, Uuid>>,
    /// Codes `code_exists` reports as taken without a backing ticket.
    reserved_codes: Mutex<Vec<String>>,
    reject_next_increment: AtomicBool,
    /// Makes the read-side pre-checks see the state from before a
    /// concurrent writer, so only the write-time guards can catch it.
    stale_reads: AtomicBool,
    fail_decrement: AtomicBool,
    pub code_checks: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&self, event: Event) {
        self.events.lock().unwrap().insert(event.id, event);
    }

    pub fn add_user(&self, id: Uuid, name: &str) {
        self.users.lock().unwrap().insert(id, name.to_string());
    }

    pub fn add_session(&self, token: &str, user_id: Uuid) {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), user_id);
    }

    pub fn reserve_all_codes(&self) {
        self.reserved_codes.lock().unwrap().push("*".to_string());
    }

    pub fn reject_next_increment(&self) {
        self.reject_next_increment.store(true, Ordering::SeqCst);
    }

    pub fn serve_stale_reads(&self) {
        self.stale_reads.store(true, Ordering::SeqCst);
    }

    fn stale(&self) -> bool {
        self.stale_reads.load(Ordering::SeqCst)
    }

    pub fn fail_decrement(&self) {
        self.fail_decrement.store(true, Ordering::SeqCst);
    }

    pub fn event(&self, id: Uuid) -> Event {
        self.events.lock().unwrap()[&id].clone()
    }

    pub fn set_sold(&self, id: Uuid, sold: i32) {
        self.events.lock().unwrap().get_mut(&id).unwrap().tickets_sold = sold;
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.lock().unwrap().len()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.events.lock().unwrap().get(&event_id).cloned())
    }

    async fn adjust_sold(&self, event_id: Uuid, delta: i32) -> Result<Option<i32>, StoreError> {
        if delta > 0 && self.reject_next_increment.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        if delta < 0 && self.fail_decrement.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        let mut events = self.events.lock().unwrap();
        let Some(event) = events.get_mut(&event_id) else {
            return Ok(None);
        };
        if event.tickets_sold + delta > event.capacity {
            return Ok(None);
        }
        event.tickets_sold = (event.tickets_sold + delta).max(0);
        Ok(Some(event.tickets_sold))
    }

    async fn reconcile_sold(
        &self,
        event_id: Uuid,
    ) -> Result<Option<SoldReconciliation>, StoreError> {
        let active = self
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.event_id == event_id)
            .count() as i32;
        let mut events = self.events.lock().unwrap();
        Ok(events.get_mut(&event_id).map(|event| {
            let previous = event.tickets_sold;
            event.tickets_sold = active.min(event.capacity);
            SoldReconciliation {
                previous,
                current: event.tickets_sold,
            }
        }))
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.lock().unwrap();
        if tickets
            .values()
            .any(|t| t.user_id == ticket.user_id && t.event_id == ticket.event_id)
        {
            return Err(StoreError::DuplicateBooking);
        }
        if tickets.values().any(|t| t.code == ticket.code) {
            return Err(StoreError::DuplicateCode);
        }
        tickets.insert(ticket.id, ticket.clone());
        Ok(ticket.clone())
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(self.tickets.lock().unwrap().get(&ticket_id).cloned())
    }

    async fn find_ticket(
        &self,
        lookup: &TicketLookup,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .values()
            .find(|t| {
                t.event_id == event_id
                    && match lookup {
                        TicketLookup::ById(id) => t.id == *id,
                        TicketLookup::ByCode(code) => t.code == *code,
                    }
            })
            .cloned()
            .map(|mut t| {
                if self.stale() {
                    t.checked_in = false;
                    t.checked_in_at = None;
                }
                t
            }))
    }

    async fn ticket_exists_for(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, StoreError> {
        if self.stale() {
            return Ok(false);
        }
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .values()
            .any(|t| t.user_id == user_id && t.event_id == event_id))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, StoreError> {
        self.code_checks.fetch_add(1, Ordering::SeqCst);
        let reserved = self.reserved_codes.lock().unwrap();
        if reserved.iter().any(|c| c == "*" || c == code) {
            return Ok(true);
        }
        Ok(self.tickets.lock().unwrap().values().any(|t| t.code == code))
    }

    async fn mark_checked_in(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
        expired: bool,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.get_mut(&ticket_id) {
            Some(ticket) if !ticket.checked_in => {
                ticket.checked_in = true;
                ticket.checked_in_at = Some(at);
                ticket.expired = expired;
                Ok(Some(ticket.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_ticket(&self, ticket_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tickets.lock().unwrap().remove(&ticket_id).is_some())
    }

    async fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.created_at);
        Ok(tickets)
    }

    async fn tickets_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Ticket, DateTime<Utc>)>, StoreError> {
        let events = self.events.lock().unwrap();
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| events.get(&t.event_id).map(|e| (t.clone(), e.end_time)))
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn authenticate(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(token).copied())
    }
}
