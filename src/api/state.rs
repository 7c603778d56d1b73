use std::sync::Arc;

use crate::core::AppConfig;

pub type SharedState = Arc<AppState>;

/// Loaded once at startup and only read afterwards
pub struct AppState {
    pub config: AppConfig,
    // Reused across requests for connection pooling
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}
