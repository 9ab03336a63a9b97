//! Application State

use std::sync::Arc;

use vault_gateway::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Settings loaded once at startup
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}
