use axum::{routing::get, routing::post, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::greeting;
use crate::state::AppState;
use crate::talk;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Demo-grade CORS: every origin, method, and header, with credentials.
    // Wildcards cannot be combined with credentials, so the layer mirrors
    // whatever the request asks for instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    // Greeting endpoints
    let greeting_routes = Router::new()
        .route("/", get(greeting::root))
        .route("/hello", get(greeting::hello));

    // Upstream small-talk proxy
    let talk_routes = Router::new().route("/talk", post(talk::talk));

    // Chat WebSocket endpoint (identity via optional query param)
    let ws_routes = Router::new().route("/chat", get(ws_handler::chat_upgrade));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(greeting_routes)
        .merge(talk_routes)
        .merge(ws_routes)
        .merge(health)
        .layer(cors)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
