use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::services::{TicketIssuer, TicketVerifier, VisualCodeEncoder};
use crate::store::{EventStore, PgStore, TicketStore, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<TicketIssuer>,
    pub verifier: Arc<TicketVerifier>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, encoder: Arc<dyn VisualCodeEncoder>, code_attempts: usize) -> Self
    where
        S: EventStore + TicketStore + UserDirectory + IdentityProvider + 'static,
    {
        let issuer = TicketIssuer::new(store.clone(), store.clone(), store.clone(), encoder)
            .with_code_attempts(code_attempts);
        let verifier = TicketVerifier::new(store.clone(), store.clone());

        Self {
            issuer: Arc::new(issuer),
            verifier: Arc::new(verifier),
            identity: store,
        }
    }

    pub fn from_pg(store: PgStore, encoder: Arc<dyn VisualCodeEncoder>, config: &Config) -> Self {
        Self::new(Arc::new(store), encoder, config.code_generation_attempts)
    }
}
