//! Connection registry: the shared set of currently active chat connections.
//!
//! Membership invariant: a connection is present exactly between handshake
//! completion and actor teardown. Every actor adds/removes only its own
//! entry; broadcasts read a point-in-time snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Type alias for the sender half of a WebSocket connection's channel.
/// Other parts of the system can clone this to push messages to a specific client.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Process-unique identifier for a single chat connection.
pub type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh connection id.
pub fn next_connection_id() -> ConnectionId {
    NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)
}

/// One live chat participant: display identity plus the write half of its
/// channel. The socket itself stays owned by the connection's actor.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: String,
    pub sender: ConnectionSender,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Invariant violation: should be unreachable given actor lifecycle
    /// discipline (one add per connection, before any remove).
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),
}

/// Connection registry: tracks all active chat WebSocket connections.
/// Cheap to clone; all clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Fails if its id is already present.
    pub fn add(&self, conn: Connection) -> Result<(), RegistryError> {
        if self.inner.contains_key(&conn.id) {
            return Err(RegistryError::DuplicateConnection(conn.id));
        }
        self.inner.insert(conn.id, conn);
        Ok(())
    }

    /// Remove a connection. Idempotent: returns false when absent, so
    /// teardown from error paths can call it unconditionally.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.inner.remove(&id).is_some()
    }

    /// Point-in-time copy of the current membership, safe to iterate while
    /// other actors add and remove their own entries.
    pub fn snapshot(&self) -> Vec<Connection> {
        self.inner.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
