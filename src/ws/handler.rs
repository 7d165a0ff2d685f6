use std::net::SocketAddr;

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::state::AppState;
use crate::ws::actor;

/// Query parameters for the chat WebSocket connection.
#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub nickname: Option<String>,
}

/// GET /chat?nickname=<optional>
/// WebSocket upgrade endpoint for the chat relay. The display identity is
/// the nickname query parameter verbatim when supplied, otherwise it is
/// derived from the client's remote address.
pub async fn chat_upgrade(
    State(state): State<AppState>,
    Query(params): Query<ChatQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let identity = params
        .nickname
        .unwrap_or_else(|| default_identity(&addr));

    tracing::info!(identity = %identity, remote = %addr, "Chat connection accepted");

    ws.on_upgrade(move |socket| actor::run_connection(socket, state, identity))
}

/// Identity for clients that supply no nickname: `unknown_<client-ip>`.
fn default_identity(addr: &SocketAddr) -> String {
    format!("unknown_{}", addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_uses_client_ip_only() {
        let addr: SocketAddr = "127.0.0.1:54321".parse().unwrap();
        assert_eq!(default_identity(&addr), "unknown_127.0.0.1");

        let v6: SocketAddr = "[::1]:9999".parse().unwrap();
        assert_eq!(default_identity(&v6), "unknown_::1");
    }
}
