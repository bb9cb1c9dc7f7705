//! Shared application state.

use crate::config::OrganConfig;

/// State handed to every handler through `web::Data`.
pub struct AppState {
    pub config: OrganConfig,
}

impl AppState {
    pub fn new(config: OrganConfig) -> Self {
        Self { config }
    }
}
