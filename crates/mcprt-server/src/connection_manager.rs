//! Admission control, idle sweeping, and broadcast fan-out across connections.
//!
//! Grounded in the same `tokio::spawn` + `tokio::time::interval` background
//! task shape `mcprt_core::utils::cancellation::PingManager` uses for its
//! keep-alive loop, and in the activity-expiry bookkeeping of the teacher's
//! HTTP `SessionStore` (lazily checking `last_activity` against a timeout on
//! access, plus a periodic sweep).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock, Semaphore};
use tracing::{debug, info, warn};

use crate::connection::{Connection, ConnectionId, ConnectionState};

/// Events the connection manager emits as connections come and go, for
/// anything (metrics, admin tooling) that wants to observe fleet size
/// without polling `ConnectionManager::list`.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Established(ConnectionId),
    Closed(ConnectionId),
}

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("connection limit reached ({limit} connections in use)")]
    LimitReached { limit: usize },
}

struct Admitted {
    connection: Connection,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

struct Inner {
    connections: RwLock<HashMap<ConnectionId, Admitted>>,
    semaphore: Arc<Semaphore>,
    max_connections: usize,
    idle_timeout: Duration,
    events: broadcast::Sender<ConnectionEvent>,
}

/// Owns the fleet of live connections: admits new ones under a connection
/// cap, evicts idle ones on a timer, and fans broadcast notifications out
/// to every connection in the `Ready` state.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(max_connections: usize, idle_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Inner {
                connections: RwLock::new(HashMap::new()),
                semaphore: Arc::new(Semaphore::new(max_connections)),
                max_connections,
                idle_timeout,
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.inner.events.subscribe()
    }

    /// Attempt to admit a new connection. Non-blocking: returns
    /// `AdmissionError::LimitReached` immediately rather than queuing if the
    /// connection cap is already saturated.
    pub async fn accept(&self, connection: Connection) -> Result<(), AdmissionError> {
        let permit = self
            .inner
            .semaphore
            .clone()
            .try_acquire_owned()
            .map_err(|_| AdmissionError::LimitReached {
                limit: self.inner.max_connections,
            })?;

        let id = connection.id();
        self.inner.connections.write().await.insert(
            id,
            Admitted {
                connection,
                _permit: permit,
            },
        );
        info!(connection_id = %id, "connection admitted");
        let _ = self.inner.events.send(ConnectionEvent::Established(id));
        Ok(())
    }

    pub async fn get(&self, id: ConnectionId) -> Option<Connection> {
        self.inner
            .connections
            .read()
            .await
            .get(&id)
            .map(|a| a.connection.clone())
    }

    pub async fn list(&self) -> Vec<Connection> {
        self.inner
            .connections
            .read()
            .await
            .values()
            .map(|a| a.connection.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Close a single connection and release its admission slot.
    pub async fn close(&self, id: ConnectionId) {
        let removed = self.inner.connections.write().await.remove(&id);
        if let Some(admitted) = removed {
            if admitted.connection.state().await != ConnectionState::Closed {
                admitted.connection.fail().await;
            }
            admitted.connection.clear_pending_outbound().await;
            // `_permit` is dropped here, releasing the admission slot.
            let _ = self.inner.events.send(ConnectionEvent::Closed(id));
            debug!(connection_id = %id, "connection closed and slot released");
        }
    }

    /// Close every tracked connection, e.g. during server shutdown.
    pub async fn close_all(&self) {
        let ids: Vec<ConnectionId> = self.inner.connections.read().await.keys().copied().collect();
        for id in ids {
            self.close(id).await;
        }
    }

    /// Broadcast a JSON-RPC message to every connection currently in the
    /// `Ready` state. Connections still initializing or closing are skipped
    /// rather than queued.
    pub async fn broadcast(&self, message: mcprt_core::protocol::JsonRpcMessage) {
        let connections = self.inner.connections.read().await;
        for admitted in connections.values() {
            let conn = &admitted.connection;
            if conn.is_ready().await {
                if let Err(err) = conn.send(message.clone()) {
                    warn!(connection_id = %conn.id(), error = %err, "broadcast send failed, dropping connection");
                }
            }
        }
    }

    /// Sweep connections that have been idle longer than the configured
    /// timeout, closing them. Intended to run on a `tokio::time::interval`
    /// loop started alongside the server.
    pub async fn sweep_idle(&self) {
        let idle_ids: Vec<ConnectionId> = {
            let connections = self.inner.connections.read().await;
            let mut ids = Vec::new();
            for admitted in connections.values() {
                if admitted.connection.idle_for().await >= self.inner.idle_timeout {
                    ids.push(admitted.connection.id());
                }
            }
            ids
        };
        for id in idle_ids {
            warn!(connection_id = %id, "closing idle connection");
            self.close(id).await;
        }
    }

    /// Spawn the background idle-sweeper task. Returns a handle the caller
    /// can abort on shutdown.
    pub fn spawn_idle_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                manager.sweep_idle().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn new_connection() -> Connection {
        let (tx, _rx) = mpsc::unbounded_channel();
        Connection::new(tx)
    }

    #[tokio::test]
    async fn admits_connections_up_to_the_cap() {
        let manager = ConnectionManager::new(1, Duration::from_secs(60));
        manager.accept(new_connection()).await.unwrap();
        let err = manager.accept(new_connection()).await.unwrap_err();
        assert!(matches!(err, AdmissionError::LimitReached { limit: 1 }));
    }

    #[tokio::test]
    async fn closing_a_connection_frees_its_admission_slot() {
        let manager = ConnectionManager::new(1, Duration::from_secs(60));
        let conn = new_connection();
        let id = conn.id();
        manager.accept(conn).await.unwrap();
        manager.close(id).await;
        manager.accept(new_connection()).await.unwrap();
    }

    #[tokio::test]
    async fn broadcast_only_reaches_ready_connections() {
        let manager = ConnectionManager::new(10, Duration::from_secs(60));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ready = Connection::new(tx);
        ready.transition(ConnectionState::Connected).await.unwrap();
        ready.transition(ConnectionState::Initializing).await.unwrap();
        ready.transition(ConnectionState::Ready).await.unwrap();
        manager.accept(ready).await.unwrap();

        let not_ready = new_connection();
        manager.accept(not_ready).await.unwrap();

        let notification = mcprt_core::protocol::JsonRpcMessage::Notification(
            mcprt_core::protocol::JsonRpcRequest::notification("notifications/message".to_string(), None),
        );
        manager.broadcast(notification).await;

        let received = rx.try_recv();
        assert!(received.is_ok());
    }

    #[tokio::test]
    async fn sweep_idle_closes_connections_past_the_timeout() {
        let manager = ConnectionManager::new(10, Duration::from_millis(10));
        let conn = new_connection();
        manager.accept(conn).await.unwrap();
        assert_eq!(manager.len().await, 1);
        tokio::time::sleep(Duration::from_millis(30)).await;
        manager.sweep_idle().await;
        assert_eq!(manager.len().await, 0);
    }
}
