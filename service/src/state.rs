//! Shared application state.

use writekit_session::SessionBroker;

use crate::config::Config;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    pub broker: SessionBroker,
}

impl AppState {
    pub fn new(config: Config, broker: SessionBroker) -> Self {
        Self { config, broker }
    }
}
