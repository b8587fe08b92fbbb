//! Per-connection state machine.
//!
//! Every transport session is represented by a [`Connection`], which tracks
//! lifecycle phase, activity timestamps, and pending outbound requests
//! independent of which transport carries its bytes. This mirrors the way
//! `mcprt_core::utils::cancellation::CancellationManager` tracks in-flight
//! requests in a `RwLock<HashMap<..>>`, applied one level up at the
//! connection rather than the individual-request granularity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use mcprt_core::protocol::jsonrpc::RequestId;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::Instant;

/// Unique identifier for a connection, distinct from any transport-level
/// session id a given transport may also maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle phase of a connection.
///
/// `Created -> Connected -> Initializing -> Ready -> Closing -> Closed`.
/// `Failed` is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Created,
    Connected,
    Initializing,
    Ready,
    Closing,
    Closed,
    Failed,
}

impl ConnectionState {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Whether `next` is a legal transition from `self`.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        matches!(
            (self, next),
            (Created, Connected)
                | (Connected, Initializing)
                | (Initializing, Ready)
                | (Ready, Closing)
                | (Closing, Closed)
                // A connection may be closed directly without a graceful
                // Closing handshake (e.g. transport drop).
                | (Connected, Closing)
                | (Initializing, Closing)
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid connection state transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// A single pending outbound request this connection's peer has not yet
/// answered (server -> client requests: `sampling/createMessage`, `roots/list`,
/// elicitation, ping).
struct PendingOutbound {
    responder: oneshot::Sender<mcprt_core::protocol::JsonRpcResponse>,
}

struct Inner {
    state: RwLock<ConnectionState>,
    last_activity_at: RwLock<Instant>,
    pending_outbound: RwLock<HashMap<RequestId, PendingOutbound>>,
    outbound_tx: mpsc::UnboundedSender<mcprt_core::protocol::JsonRpcMessage>,
}

/// Handle to a live connection's state and outbound channel.
///
/// Cheaply `Clone`-able; every clone refers to the same underlying
/// connection. The `Connection` itself does not own a transport — it is
/// driven by whichever transport loop reads frames and calls its methods.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    inner: Arc<Inner>,
}

impl Connection {
    /// Create a new connection in the `Created` state. `outbound_tx` is the
    /// channel a transport loop drains to learn what to write to the peer.
    pub fn new(outbound_tx: mpsc::UnboundedSender<mcprt_core::protocol::JsonRpcMessage>) -> Self {
        Self {
            id: ConnectionId::next(),
            inner: Arc::new(Inner {
                state: RwLock::new(ConnectionState::Created),
                last_activity_at: RwLock::new(Instant::now()),
                pending_outbound: RwLock::new(HashMap::new()),
                outbound_tx,
            }),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub async fn state(&self) -> ConnectionState {
        *self.inner.state.read().await
    }

    /// Move to `next`, failing if the transition is not legal from the
    /// current state. Always records activity on success.
    pub async fn transition(&self, next: ConnectionState) -> Result<(), InvalidTransition> {
        let mut state = self.inner.state.write().await;
        if !state.can_transition_to(next) {
            return Err(InvalidTransition {
                from: *state,
                to: next,
            });
        }
        *state = next;
        drop(state);
        self.touch().await;
        Ok(())
    }

    /// Force the connection into `Failed` regardless of current state,
    /// unless it is already terminal.
    pub async fn fail(&self) {
        let mut state = self.inner.state.write().await;
        if !state.is_terminal() {
            *state = ConnectionState::Failed;
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == ConnectionState::Ready
    }

    pub async fn is_terminal(&self) -> bool {
        self.state().await.is_terminal()
    }

    /// Record that a message was sent or received on this connection, for
    /// idle-timeout bookkeeping.
    pub async fn touch(&self) {
        *self.inner.last_activity_at.write().await = Instant::now();
    }

    pub async fn idle_for(&self) -> std::time::Duration {
        self.inner.last_activity_at.read().await.elapsed()
    }

    /// Send a message out to the peer via the transport's outbound channel.
    pub fn send(
        &self,
        message: mcprt_core::protocol::JsonRpcMessage,
    ) -> Result<(), mcprt_core::error::TransportError> {
        self.inner
            .outbound_tx
            .send(message)
            .map_err(|_| mcprt_core::error::TransportError::Closed)
    }

    /// Register a server-initiated request awaiting a response from the
    /// peer, returning a future that resolves when `resolve_outbound` is
    /// called with a matching id (or is dropped if the connection closes).
    pub async fn register_outbound(
        &self,
        id: RequestId,
    ) -> oneshot::Receiver<mcprt_core::protocol::JsonRpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .pending_outbound
            .write()
            .await
            .insert(id, PendingOutbound { responder: tx });
        rx
    }

    /// Resolve a pending outbound request when its response arrives.
    /// Silently ignored if no such request is pending (e.g. it already
    /// timed out or the response id is unknown).
    pub async fn resolve_outbound(&self, id: &RequestId, response: mcprt_core::protocol::JsonRpcResponse) {
        if let Some(pending) = self.inner.pending_outbound.write().await.remove(id) {
            let _ = pending.responder.send(response);
        }
        self.touch().await;
    }

    /// Drop all pending outbound requests, e.g. on connection close.
    pub async fn clear_pending_outbound(&self) {
        self.inner.pending_outbound.write().await.clear();
    }
}

pub(crate) fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_connection() -> Connection {
        let (tx, _rx) = mpsc::unbounded_channel();
        Connection::new(tx)
    }

    #[tokio::test]
    async fn starts_in_created_state() {
        let conn = new_connection();
        assert_eq!(conn.state().await, ConnectionState::Created);
    }

    #[tokio::test]
    async fn follows_the_happy_path_transitions() {
        let conn = new_connection();
        conn.transition(ConnectionState::Connected).await.unwrap();
        conn.transition(ConnectionState::Initializing).await.unwrap();
        conn.transition(ConnectionState::Ready).await.unwrap();
        assert!(conn.is_ready().await);
        conn.transition(ConnectionState::Closing).await.unwrap();
        conn.transition(ConnectionState::Closed).await.unwrap();
        assert!(conn.is_terminal().await);
    }

    #[tokio::test]
    async fn rejects_illegal_transitions() {
        let conn = new_connection();
        let err = conn.transition(ConnectionState::Ready).await.unwrap_err();
        assert_eq!(err.from, ConnectionState::Created);
        assert_eq!(err.to, ConnectionState::Ready);
    }

    #[tokio::test]
    async fn fail_is_reachable_from_any_non_terminal_state() {
        let conn = new_connection();
        conn.transition(ConnectionState::Connected).await.unwrap();
        conn.fail().await;
        assert_eq!(conn.state().await, ConnectionState::Failed);
    }

    #[tokio::test]
    async fn fail_is_a_no_op_once_closed() {
        let conn = new_connection();
        conn.transition(ConnectionState::Connected).await.unwrap();
        conn.transition(ConnectionState::Closing).await.unwrap();
        conn.transition(ConnectionState::Closed).await.unwrap();
        conn.fail().await;
        assert_eq!(conn.state().await, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn outbound_request_resolves_when_a_matching_response_arrives() {
        let conn = new_connection();
        let id = RequestId::number(1);
        let rx = conn.register_outbound(id.clone()).await;
        let response = mcprt_core::protocol::JsonRpcResponse::success(
            serde_json::json!({"ok": true}),
            Some(id.clone()),
        );
        conn.resolve_outbound(&id, response.clone()).await;
        let received = rx.await.unwrap();
        assert_eq!(received.result, response.result);
    }

    #[tokio::test]
    async fn resolving_an_unknown_outbound_id_is_silently_ignored() {
        let conn = new_connection();
        let response = mcprt_core::protocol::JsonRpcResponse::success(
            serde_json::json!({"ok": true}),
            Some(RequestId::number(99)),
        );
        conn.resolve_outbound(&RequestId::number(99), response).await;
    }
}
