//! Shared application state.

use crate::config::SessionConfig;
use reservation_relay_conversation::SessionStore;
use reservation_relay_nlu::NluClient;
use std::sync::Arc;

/// State shared by every request handler.
pub struct AppState {
    /// Live reservation dialogues.
    pub store: SessionStore,
    /// Client for the NLU service.
    pub nlu: Arc<dyn NluClient>,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates application state with an empty session store.
    pub fn new(nlu: Arc<dyn NluClient>, session_config: SessionConfig) -> Self {
        Self {
            store: SessionStore::with_config(session_config.store_config()),
            nlu,
            session_config,
        }
    }
}
