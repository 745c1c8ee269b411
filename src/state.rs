use std::sync::Arc;

use crate::config::Config;
use crate::services::TodoStore;
use crate::session::SessionRegistry;

/// State shared by the acceptor and every connection handler.
pub struct AppState {
    pub config: Config,
    pub store: TodoStore,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let sessions = SessionRegistry::new(config.send_timeout());
        Arc::new(Self {
            config,
            store: TodoStore::new(),
            sessions,
        })
    }
}
