//! Per-URI resource subscription fan-out.
//!
//! Distinct from [`crate::handlers::ResourceSubscriptionHandler`], which is
//! the collaborator contract a host application implements to learn when a
//! client subscribes or unsubscribes. `SubscriptionHub` is the server-side
//! piece that actually delivers `notifications/resources/updated` (and
//! friends) back to every connection subscribed to a given URI, in order,
//! without a slow connection stalling delivery to the others.
//!
//! Grounded on [`crate::connection_manager::ConnectionManager`]'s
//! `broadcast`/`Admitted` shape: each observer gets its own bounded channel
//! and a dedicated draining task, the same way a semaphore permit ties a
//! connection's admission to its own lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use mcprt_core::protocol::jsonrpc::JsonRpcRequest;
use mcprt_core::protocol::JsonRpcMessage;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::connection::{Connection, ConnectionId};

/// An event about a subscribed resource, delivered to every observer of its
/// URI in the order it was published.
#[derive(Debug, Clone)]
pub enum ResourceEvent {
    Created(Value),
    Updated(Value),
    Deleted,
    Error(String),
}

impl ResourceEvent {
    fn notification_method(&self) -> &'static str {
        match self {
            ResourceEvent::Created(_) => "notifications/resources/created",
            ResourceEvent::Updated(_) => "notifications/resources/updated",
            ResourceEvent::Deleted => "notifications/resources/deleted",
            ResourceEvent::Error(_) => "notifications/resources/error",
        }
    }

    fn params(&self, uri: &str) -> Value {
        match self {
            ResourceEvent::Created(content) | ResourceEvent::Updated(content) => {
                serde_json::json!({"uri": uri, "content": content})
            }
            ResourceEvent::Deleted => serde_json::json!({"uri": uri}),
            ResourceEvent::Error(message) => serde_json::json!({"uri": uri, "error": message}),
        }
    }
}

/// Number of consecutive delivery failures before an observer is evicted
/// from a URI's subscriber list.
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Bound on each observer's pending-event queue. A slow observer that falls
/// this far behind starts losing its oldest unsent events rather than
/// unboundedly growing memory or blocking the publisher.
const OBSERVER_QUEUE_DEPTH: usize = 64;

struct Observer {
    tx: mpsc::Sender<ResourceEvent>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Inner {
    subscribers: RwLock<HashMap<String, HashMap<ConnectionId, Observer>>>,
}

/// Fan-out hub mapping resource URIs to their subscribed connections.
#[derive(Clone)]
pub struct SubscriptionHub {
    inner: Arc<Inner>,
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe `connection` to `uri`. Re-subscribing replaces the prior
    /// observer task for that (uri, connection) pair.
    pub async fn subscribe(&self, uri: String, connection: Connection) {
        let (tx, rx) = mpsc::channel(OBSERVER_QUEUE_DEPTH);
        let task_uri = uri.clone();
        let task_connection = connection.clone();
        let task = tokio::spawn(async move {
            Self::drain(task_uri, task_connection, rx).await;
        });
        let observer = Observer { tx, task };

        let mut subscribers = self.inner.subscribers.write().await;
        subscribers
            .entry(uri)
            .or_default()
            .insert(connection.id(), observer);
    }

    /// Remove `connection` from `uri`'s subscriber list, if present.
    pub async fn unsubscribe(&self, uri: &str, connection_id: ConnectionId) {
        let mut subscribers = self.inner.subscribers.write().await;
        if let Some(observers) = subscribers.get_mut(uri) {
            observers.remove(&connection_id);
            if observers.is_empty() {
                subscribers.remove(uri);
            }
        }
    }

    /// Remove `connection_id` from every URI it is subscribed to, e.g. when
    /// a connection closes.
    pub async fn unsubscribe_all(&self, connection_id: ConnectionId) {
        let mut subscribers = self.inner.subscribers.write().await;
        subscribers.retain(|_, observers| {
            observers.remove(&connection_id);
            !observers.is_empty()
        });
    }

    pub async fn subscriber_count(&self, uri: &str) -> usize {
        self.inner
            .subscribers
            .read()
            .await
            .get(uri)
            .map(|observers| observers.len())
            .unwrap_or(0)
    }

    pub async fn is_subscribed(&self, uri: &str, connection_id: ConnectionId) -> bool {
        self.inner
            .subscribers
            .read()
            .await
            .get(uri)
            .map(|observers| observers.contains_key(&connection_id))
            .unwrap_or(false)
    }

    /// Publish `event` to every observer currently subscribed to `uri`.
    /// Delivery to each observer happens on its own task, so one slow
    /// observer cannot delay delivery to the others; queue overflow drops
    /// the event for that observer only (`try_send`, never blocking here).
    pub async fn publish(&self, uri: &str, event: ResourceEvent) {
        let subscribers = self.inner.subscribers.read().await;
        let Some(observers) = subscribers.get(uri) else {
            return;
        };
        for (connection_id, observer) in observers.iter() {
            if observer.tx.try_send(event.clone()).is_err() {
                warn!(uri, connection = %connection_id, "subscriber queue full, dropping event");
            }
        }
    }

    /// Drains one observer's queue, delivering events in order and evicting
    /// itself (by returning, which drops its entry's `Observer` the next
    /// time the owning map is touched) after too many consecutive
    /// delivery failures, notifying the connection's own logger of the
    /// eviction if still reachable.
    async fn drain(uri: String, connection: Connection, mut rx: mpsc::Receiver<ResourceEvent>) {
        let mut consecutive_failures = 0u32;
        while let Some(event) = rx.recv().await {
            let method = event.notification_method();
            let params = event.params(&uri);
            let notification = JsonRpcRequest::notification(method.to_string(), Some(params));
            match connection.send(JsonRpcMessage::Notification(notification)) {
                Ok(()) => {
                    consecutive_failures = 0;
                }
                Err(_) => {
                    consecutive_failures += 1;
                    warn!(uri, connection = %connection.id(), consecutive_failures, "failed to deliver subscription event");
                    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        warn!(uri, connection = %connection.id(), "evicting unreachable subscriber");
                        return;
                    }
                }
            }
        }
        debug!(uri, connection = %connection.id(), "subscription observer channel closed");
    }
}

impl Default for SubscriptionHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc as tmpsc;
    use tokio::time::{sleep, Duration};

    fn new_connection() -> (Connection, tmpsc::UnboundedReceiver<JsonRpcMessage>) {
        let (tx, rx) = tmpsc::unbounded_channel();
        (Connection::new(tx), rx)
    }

    #[tokio::test]
    async fn subscribing_registers_the_connection() {
        let hub = SubscriptionHub::new();
        let (conn, _rx) = new_connection();
        hub.subscribe("file:///a.txt".to_string(), conn.clone()).await;
        assert_eq!(hub.subscriber_count("file:///a.txt").await, 1);
        assert!(hub.is_subscribed("file:///a.txt", conn.id()).await);
    }

    #[tokio::test]
    async fn unsubscribing_removes_the_connection() {
        let hub = SubscriptionHub::new();
        let (conn, _rx) = new_connection();
        hub.subscribe("file:///a.txt".to_string(), conn.clone()).await;
        hub.unsubscribe("file:///a.txt", conn.id()).await;
        assert_eq!(hub.subscriber_count("file:///a.txt").await, 0);
    }

    #[tokio::test]
    async fn publish_delivers_to_subscribed_connections() {
        let hub = SubscriptionHub::new();
        let (conn, mut rx) = new_connection();
        hub.subscribe("file:///a.txt".to_string(), conn.clone()).await;
        hub.publish(
            "file:///a.txt",
            ResourceEvent::Updated(serde_json::json!({"text": "hi"})),
        )
        .await;
        let message = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match message {
            JsonRpcMessage::Notification(req) => {
                assert_eq!(req.method, "notifications/resources/updated");
            }
            _ => panic!("expected a notification"),
        }
    }

    #[tokio::test]
    async fn unsubscribe_all_clears_every_uri() {
        let hub = SubscriptionHub::new();
        let (conn, _rx) = new_connection();
        hub.subscribe("file:///a.txt".to_string(), conn.clone()).await;
        hub.subscribe("file:///b.txt".to_string(), conn.clone()).await;
        hub.unsubscribe_all(conn.id()).await;
        assert_eq!(hub.subscriber_count("file:///a.txt").await, 0);
        assert_eq!(hub.subscriber_count("file:///b.txt").await, 0);
    }

    #[tokio::test]
    async fn publishing_to_an_unsubscribed_uri_is_a_no_op() {
        let hub = SubscriptionHub::new();
        hub.publish("file:///nobody.txt", ResourceEvent::Deleted).await;
        sleep(Duration::from_millis(10)).await;
    }
}
