use thiserror::Error;

use super::visual_code::EncodeError;
use crate::store::StoreError;

/// Coarse classification shared by every failure the services return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    InvalidState,
    DependentService,
    Internal,
}

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Event not found")]
    EventNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Provide either a ticket id or a ticket code")]
    MissingIdentifier,

    #[error("{0}")]
    Forbidden(String),

    #[error("You already booked this event")]
    AlreadyBooked,

    #[error("This event is sold out")]
    SoldOut,

    #[error("Could not allocate a unique ticket code")]
    CodeGenerationExhausted,

    #[error("Ticket sales closed when the event started")]
    SalesClosed,

    #[error("Event has not started yet")]
    EventNotStarted,

    #[error("Event has already ended")]
    EventEnded,

    #[error("User directory lookup failed: {0}")]
    Directory(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

impl TicketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TicketError::MissingIdentifier => ErrorKind::Validation,
            TicketError::EventNotFound | TicketError::TicketNotFound => ErrorKind::NotFound,
            TicketError::Forbidden(_) => ErrorKind::Forbidden,
            TicketError::AlreadyBooked
            | TicketError::SoldOut
            | TicketError::CodeGenerationExhausted => ErrorKind::Conflict,
            TicketError::SalesClosed | TicketError::EventNotStarted | TicketError::EventEnded => {
                ErrorKind::InvalidState
            }
            TicketError::Store(StoreError::DuplicateBooking) => ErrorKind::Conflict,
            TicketError::Store(_) | TicketError::Encoding(_) | TicketError::Directory(_) => {
                ErrorKind::DependentService
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(TicketError::SoldOut.kind(), ErrorKind::Conflict);
        assert_eq!(TicketError::CodeGenerationExhausted.kind(), ErrorKind::Conflict);
        assert_eq!(TicketError::EventNotStarted.kind(), ErrorKind::InvalidState);
        assert_eq!(
            TicketError::Store(StoreError::Unavailable("down".into())).kind(),
            ErrorKind::DependentService
        );
        assert_eq!(
            TicketError::Directory("no entry".into()).kind(),
            ErrorKind::DependentService
        );
        assert_eq!(
            TicketError::Forbidden("nope".into()).kind(),
            ErrorKind::Forbidden
        );
    }
}
