pub mod code;
pub mod error;
pub mod issuer;
pub mod verifier;
pub mod visual_code;
pub mod window;

pub use error::{ErrorKind, TicketError};
pub use issuer::TicketIssuer;
pub use verifier::TicketVerifier;
pub use visual_code::{QrCodeEncoder, VisualCodeEncoder};
