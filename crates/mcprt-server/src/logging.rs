//! Per-connection `logging/setLevel` state and `notifications/message`
//! fan-out.
//!
//! Generalizes [`crate::context::Context`]'s `LoggerConfig`/`log_with_level`
//! machinery (built for a single in-flight tool call) to the server's full
//! set of live connections, each of which may set its own minimum level per
//! the `logging/setLevel` request.

use std::collections::HashMap;
use std::sync::Arc;

use mcprt_core::protocol::jsonrpc::JsonRpcRequest;
use mcprt_core::protocol::JsonRpcMessage;
use mcprt_core::types::notifications::{LogLevel, LoggingMessageNotification};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::connection::{Connection, ConnectionId};
use crate::connection_manager::ConnectionManager;

fn log_level_priority(level: &LogLevel) -> u8 {
    match level {
        LogLevel::Debug => 0,
        LogLevel::Info => 1,
        LogLevel::Notice => 2,
        LogLevel::Warning => 3,
        LogLevel::Error => 4,
        LogLevel::Critical => 5,
        LogLevel::Alert => 6,
        LogLevel::Emergency => 7,
    }
}

/// Tracks each connection's minimum log level and delivers
/// `notifications/message` to the ones whose level admits a given event.
pub struct LoggingService {
    levels: RwLock<HashMap<ConnectionId, LogLevel>>,
    default_level: LogLevel,
    logger_name: String,
}

impl LoggingService {
    pub fn new(default_level: LogLevel) -> Self {
        Self {
            levels: RwLock::new(HashMap::new()),
            default_level,
            logger_name: "mcprt-server".to_string(),
        }
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    /// Set `connection_id`'s minimum level, per a `logging/setLevel` call.
    pub async fn set_level(&self, connection_id: ConnectionId, level: LogLevel) {
        self.levels.write().await.insert(connection_id, level);
    }

    pub async fn level_for(&self, connection_id: ConnectionId) -> LogLevel {
        self.levels
            .read()
            .await
            .get(&connection_id)
            .cloned()
            .unwrap_or_else(|| self.default_level.clone())
    }

    /// Forget a connection's configured level, e.g. on close.
    pub async fn forget(&self, connection_id: ConnectionId) {
        self.levels.write().await.remove(&connection_id);
    }

    fn emit_to_tracing(&self, level: &LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!("{message}"),
            LogLevel::Info | LogLevel::Notice => info!("{message}"),
            LogLevel::Warning => warn!("{message}"),
            LogLevel::Error | LogLevel::Critical | LogLevel::Alert | LogLevel::Emergency => {
                error!("{message}")
            }
        }
    }

    /// Deliver a log message to a single connection if its configured
    /// level admits `level`. Returns whether the message was sent.
    pub async fn log(&self, connection: &Connection, level: LogLevel, data: Value) -> bool {
        self.emit_to_tracing(&level, &data.to_string());
        let min_level = self.level_for(connection.id()).await;
        if log_level_priority(&level) < log_level_priority(&min_level) {
            return false;
        }
        let notification = LoggingMessageNotification::new(level, data)
            .with_logger(self.logger_name.clone());
        let request = match serde_json::to_value(&notification) {
            Ok(params) => JsonRpcRequest::notification("notifications/message".to_string(), Some(params)),
            Err(e) => {
                error!("failed to serialize logging notification: {e}");
                return false;
            }
        };
        connection.send(JsonRpcMessage::Notification(request)).is_ok()
    }

    /// Deliver a log message to every connection whose configured level
    /// admits it.
    pub async fn broadcast(&self, connections: &ConnectionManager, level: LogLevel, data: Value) {
        self.emit_to_tracing(&level, &data.to_string());
        for connection in connections.list().await {
            let min_level = self.level_for(connection.id()).await;
            if log_level_priority(&level) < log_level_priority(&min_level) {
                continue;
            }
            let notification = LoggingMessageNotification::new(level.clone(), data.clone())
                .with_logger(self.logger_name.clone());
            let params = match serde_json::to_value(&notification) {
                Ok(params) => params,
                Err(e) => {
                    error!("failed to serialize logging notification: {e}");
                    continue;
                }
            };
            let request = JsonRpcRequest::notification("notifications/message".to_string(), Some(params));
            let _ = connection.send(JsonRpcMessage::Notification(request));
        }
    }
}

impl Default for LoggingService {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

/// Shared handle convenience, mirroring how [`ConnectionManager`] and
/// [`crate::router::Router`] are threaded through `UltraFastServer`.
pub type SharedLoggingService = Arc<LoggingService>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn new_connection() -> (Connection, mpsc::UnboundedReceiver<JsonRpcMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(tx), rx)
    }

    #[tokio::test]
    async fn default_level_filters_out_debug_messages() {
        let service = LoggingService::new(LogLevel::Info);
        let (conn, mut rx) = new_connection();
        let sent = service
            .log(&conn, LogLevel::Debug, serde_json::json!({"msg": "noisy"}))
            .await;
        assert!(!sent);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn raising_level_allows_matching_messages_through() {
        let service = LoggingService::new(LogLevel::Info);
        let (conn, mut rx) = new_connection();
        service.set_level(conn.id(), LogLevel::Debug).await;
        let sent = service
            .log(&conn, LogLevel::Debug, serde_json::json!({"msg": "visible now"}))
            .await;
        assert!(sent);
        let message = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match message {
            JsonRpcMessage::Notification(req) => assert_eq!(req.method, "notifications/message"),
            _ => panic!("expected a notification"),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_connections_admitted_by_their_own_level() {
        let manager = ConnectionManager::new(16, Duration::from_secs(60));
        let (conn_a, mut rx_a) = new_connection();
        let (conn_b, mut rx_b) = new_connection();
        manager.accept(conn_a.clone()).await.unwrap();
        manager.accept(conn_b.clone()).await.unwrap();

        let service = LoggingService::new(LogLevel::Warning);
        service.set_level(conn_a.id(), LogLevel::Debug).await;

        service
            .broadcast(&manager, LogLevel::Debug, serde_json::json!({"msg": "debug"}))
            .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn forget_resets_a_connection_to_the_default_level() {
        let service = LoggingService::new(LogLevel::Info);
        let (conn, _rx) = new_connection();
        service.set_level(conn.id(), LogLevel::Debug).await;
        service.forget(conn.id()).await;
        assert!(matches!(service.level_for(conn.id()).await, LogLevel::Info));
    }
}
