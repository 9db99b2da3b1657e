use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Ticket, TicketLookup, VerifyOutcome};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct BookTicketRequest {
    pub event_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTicketRequest {
    pub event_id: Uuid,
    pub ticket_id: Option<Uuid>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub event_id: Uuid,
    pub ticket_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct VerifyTicketResponse {
    pub status: &'static str,
    pub ticket: Ticket,
}

pub async fn book_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<BookTicketRequest>,
) -> Result<Response, AppError> {
    let ticket = state
        .issuer
        .book_ticket(user.user_id, body.event_id, Utc::now())
        .await?;

    Ok(created(ticket, "Ticket booked"))
}

pub async fn my_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let tickets = state.issuer.tickets_for_user(user.user_id, Utc::now()).await?;
    Ok(success(tickets, "Tickets retrieved"))
}

pub async fn event_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let tickets = state
        .verifier
        .tickets_for_event(event_id, user.user_id, Utc::now())
        .await?;

    Ok(success(tickets, "Tickets retrieved"))
}

async fn run_verify(
    state: &AppState,
    lookup: Option<TicketLookup>,
    event_id: Uuid,
    organizer_id: Uuid,
) -> Result<Response, AppError> {
    let outcome = state
        .verifier
        .verify(lookup, event_id, organizer_id, Utc::now())
        .await?;

    let message = match outcome {
        VerifyOutcome::Verified(_) => "VERIFIED_SUCCESS",
        VerifyOutcome::AlreadyVerified(_) => "ALREADY_VERIFIED",
    };
    let payload = VerifyTicketResponse {
        status: outcome.status(),
        ticket: outcome.into_ticket(),
    };

    Ok(success(payload, message))
}

pub async fn verify_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<VerifyTicketRequest>,
) -> Result<Response, AppError> {
    let lookup = TicketLookup::from_parts(body.ticket_id, body.code);
    run_verify(&state, lookup, body.event_id, user.user_id).await
}

pub async fn check_in_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CheckInRequest>,
) -> Result<Response, AppError> {
    let lookup = Some(TicketLookup::ById(body.ticket_id));
    run_verify(&state, lookup, body.event_id, user.user_id).await
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.issuer.cancel(ticket_id, user.user_id).await?;
    Ok(empty_success("Ticket cancelled successfully"))
}

pub async fn reconcile_sold(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let result = state.issuer.reconcile_sold(event_id, user.user_id).await?;
    Ok(success(result, "Sold counter reconciled"))
}
