use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, RequestTimeoutLayer};
use crate::handlers::health_check;
use crate::handlers::tickets::{
    book_ticket, cancel_ticket, check_in_ticket, event_tickets, my_tickets, reconcile_sold,
    verify_ticket,
};
use crate::state::AppState;

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/book", post(book_ticket))
        .route("/my-tickets", get(my_tickets))
        .route("/event/:event_id", get(event_tickets))
        .route("/event/:event_id/reconcile", post(reconcile_sold))
        .route("/verify", post(verify_ticket))
        .route("/check-in", post(check_in_ticket))
        .route("/cancel/:ticket_id", delete(cancel_ticket))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/tickets", ticket_routes())
        .with_state(state)
        .layer(RequestTimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
