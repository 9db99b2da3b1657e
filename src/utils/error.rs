use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::{ErrorKind, TicketError};
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict ({reason}): {message}")]
    Conflict {
        reason: &'static str,
        message: String,
    },

    #[error("Invalid state ({reason}): {message}")]
    InvalidState {
        reason: &'static str,
        message: String,
    },

    #[error("Dependent service error: {0}")]
    DependentServiceError(String),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            AppError::DependentServiceError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::InvalidState { .. } => "INVALID_STATE",
            AppError::DependentServiceError(_) => "DEPENDENT_SERVICE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DependentServiceError(detail) | AppError::InternalServerError(detail) => {
                error!(error = ?self, detail = %detail, "Application error");
            }
            _ => {
                error!(error = ?self, "Application error");
            }
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => AppError::ValidationError(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Forbidden => AppError::Forbidden(message),
            ErrorKind::Conflict => AppError::Conflict {
                reason: reason(&err),
                message,
            },
            ErrorKind::InvalidState => AppError::InvalidState {
                reason: reason(&err),
                message,
            },
            ErrorKind::DependentService => AppError::DependentServiceError(message),
            ErrorKind::Internal => AppError::InternalServerError(message),
        }
    }
}

fn reason(err: &TicketError) -> &'static str {
    match err {
        TicketError::AlreadyBooked => "ALREADY_BOOKED",
        TicketError::SoldOut => "SOLD_OUT",
        TicketError::CodeGenerationExhausted => "CODE_GENERATION_EXHAUSTED",
        TicketError::SalesClosed => "SALES_CLOSED",
        TicketError::EventNotStarted => "EVENT_NOT_STARTED",
        TicketError::EventEnded => "EVENT_ENDED",
        TicketError::Store(StoreError::DuplicateBooking) => "ALREADY_BOOKED",
        _ => "UNSPECIFIED",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict { message, .. } | AppError::InvalidState { message, .. } => {
                message.clone()
            }
            AppError::DependentServiceError(_) => {
                "A dependent service is unavailable, try again later".to_string()
            }
            AppError::InternalServerError(_) => "Internal server error".to_string(),
        };

        let details = match &self {
            AppError::Conflict { reason, .. } | AppError::InvalidState { reason, .. } => {
                Some(json!({ "reason": reason }))
            }
            _ => None,
        };

        error_response(code, public_message, details, status)
    }
}
