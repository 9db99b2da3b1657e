pub mod event;
pub mod ticket;
pub mod user;

pub use event::{Event, SoldReconciliation};
pub use ticket::{Ticket, TicketLookup, VerifyOutcome};
pub use user::User;
