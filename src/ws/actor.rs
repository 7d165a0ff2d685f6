use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use crate::state::AppState;
use crate::ws::broadcast;
use crate::ws::protocol::{self, ProtocolError};
use crate::ws::registry::{next_connection_id, Connection};

/// Ping interval: server sends WebSocket ping every 30 seconds.
/// Prevents connection leaks from abrupt disconnects.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Pong timeout: if pong not received within 10 seconds after ping, close.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket close code for a frame that violated the chat protocol.
const CLOSE_INVALID_PAYLOAD: u16 = 1007;

/// How long teardown waits for the writer task to flush queued frames
/// before abandoning it.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the actor-per-connection pattern for a chat WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from an mpsc channel
/// - Reader task: tags each inbound frame with this connection's identity
///   and fans it out to every registered connection
///
/// The mpsc channel is what gets registered: any session's broadcast can
/// clone the sender to push frames to this client.
pub async fn run_connection(socket: WebSocket, state: AppState, identity: String) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let conn_id = next_connection_id();

    // Register this connection in the registry. A duplicate id means the
    // lifecycle invariant is broken; refuse the session rather than corrupt
    // the registry.
    if let Err(e) = state.connections.add(Connection {
        id: conn_id,
        identity: identity.clone(),
        sender: tx.clone(),
    }) {
        tracing::error!(identity = %identity, error = %e, "Connection registration failed");
        let mut ws_sender = ws_sender;
        let _ = ws_sender
            .send(Message::Close(Some(CloseFrame {
                code: 1011,
                reason: "registration failed".into(),
            })))
            .await;
        return;
    }

    tracing::info!(
        identity = %identity,
        connections = state.connections.len(),
        "Chat actor started"
    );

    // Spawn writer task: forwards mpsc messages to the WebSocket sink
    let mut writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Track pong reception
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();

    // Spawn ping task: sends periodic pings and monitors pong responses
    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            // Send ping
            if ping_tx.send(Message::Ping(vec![1, 2, 3, 4].into())).is_err() {
                // Writer task has died — connection is gone
                break;
            }

            // Wait for pong within timeout
            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {
                    // Pong received, continue
                }
                _ => {
                    // Pong timeout or channel closed — close connection
                    tracing::warn!("Pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(Some(CloseFrame {
                        code: 1001,
                        reason: "Pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    // Reader loop: process incoming WebSocket messages
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    match protocol::tag_frame(text.as_str(), &identity) {
                        Ok(frame) => {
                            broadcast::broadcast_to_all(&state.connections, &frame);
                        }
                        Err(e) => {
                            close_for_protocol_error(&tx, &identity, &e);
                            break;
                        }
                    }
                }
                Message::Binary(_) => {
                    // The chat protocol is text JSON only.
                    close_for_protocol_error(&tx, &identity, &ProtocolError::BinaryFrame);
                    break;
                }
                Message::Pong(_) => {
                    // Pong received — notify the ping task
                    let _ = pong_tx.send(());
                }
                Message::Ping(data) => {
                    // Respond to client pings with pong
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(frame) => {
                    tracing::info!(
                        identity = %identity,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(
                    identity = %identity,
                    error = %e,
                    "WebSocket receive error"
                );
                break;
            }
            None => {
                // Stream ended — client disconnected
                tracing::info!(identity = %identity, "WebSocket stream ended");
                break;
            }
        }
    }

    // Teardown: runs on every exit path from the reader loop so the
    // registry never leaks an entry. Remove first so no new broadcast can
    // queue frames, then drop our sender and give the writer a short window
    // to flush anything already queued (close frames included).
    ping_handle.abort();
    state.connections.remove(conn_id);
    drop(tx);
    if timeout(WRITER_DRAIN_TIMEOUT, &mut writer_handle).await.is_err() {
        writer_handle.abort();
    }

    tracing::info!(
        identity = %identity,
        connections = state.connections.len(),
        "Chat actor stopped"
    );
}

/// Writer task: receives messages from mpsc channel and forwards them to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}

/// A malformed frame terminates only the offending session: queue a close
/// frame for the writer and let the caller break out of the reader loop.
fn close_for_protocol_error(
    tx: &mpsc::UnboundedSender<Message>,
    identity: &str,
    err: &ProtocolError,
) {
    tracing::warn!(
        identity = %identity,
        error = %err,
        "Protocol error, closing session"
    );
    let _ = tx.send(Message::Close(Some(CloseFrame {
        code: CLOSE_INVALID_PAYLOAD,
        reason: "invalid chat frame".into(),
    })));
}
