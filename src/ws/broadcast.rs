//! Snapshot fan-out to every registered connection.

use axum::extract::ws::Message;

use super::registry::ConnectionRegistry;

/// Broadcast a tagged frame to all registered connections, including the
/// sender. Works from a point-in-time snapshot so connects and disconnects
/// on other sessions can proceed mid-broadcast: a connection that joins
/// after the snapshot misses this frame, and one that left merely fails its
/// send, which is logged and skipped rather than aborting the fan-out.
pub fn broadcast_to_all(registry: &ConnectionRegistry, frame: &str) {
    let msg = Message::Text(frame.to_string().into());

    for conn in registry.snapshot() {
        if conn.sender.send(msg.clone()).is_err() {
            // Receiver dropped: the recipient's writer task has terminated
            // and its actor is tearing down.
            tracing::debug!(
                identity = %conn.identity,
                "Dropping broadcast for closed connection"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::registry::Connection;
    use tokio::sync::mpsc;

    #[test]
    fn broadcast_survives_a_closed_recipient() {
        let registry = ConnectionRegistry::new();

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        registry
            .add(Connection { id: 1, identity: "a".into(), sender: tx_a })
            .unwrap();
        registry
            .add(Connection { id: 2, identity: "b".into(), sender: tx_b })
            .unwrap();
        registry
            .add(Connection { id: 3, identity: "c".into(), sender: tx_c })
            .unwrap();

        // b's receiver is gone, as after an abrupt disconnect.
        drop(rx_b);

        broadcast_to_all(&registry, r#"{"message":"hi","nickname":"a"}"#);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
    }
}
