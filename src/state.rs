use crate::ws::registry::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Active chat WebSocket connections
    pub connections: ConnectionRegistry,
    /// HTTP client for the upstream small-talk API (connection-pooled)
    pub http: reqwest::Client,
    /// Upstream small-talk API endpoint
    pub talk_api_url: String,
    /// API key sent alongside each upstream query
    pub talk_api_key: String,
}

impl AppState {
    pub fn new(talk_api_url: String, talk_api_key: String) -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            http: reqwest::Client::new(),
            talk_api_url,
            talk_api_key,
        }
    }
}
