//! Duplex WebSocket transport.
//!
//! After the upgrade handshake both sides exchange discrete text frames.
//! Ping/keep-alive runs on a fixed interval; oversize outbound frames are
//! rejected locally with `MessageTooLarge` rather than sent, and an oversize
//! inbound frame closes the connection the same way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use mcprt_core::protocol::JsonRpcMessage;

use crate::{ConnectionState, Result, Transport, TransportError, TransportHealth};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration for a [`SocketTransport`] connection.
#[derive(Debug, Clone)]
pub struct SocketTransportConfig {
    pub url: String,
    pub auth_token: Option<String>,
    /// Maximum serialized frame size, enforced on both send and receive.
    pub max_frame_size: usize,
    /// Interval between keep-alive pings.
    pub ping_interval: Duration,
}

impl Default for SocketTransportConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080/mcp".to_string(),
            auth_token: None,
            max_frame_size: 16 * 1024 * 1024,
            ping_interval: Duration::from_secs(30),
        }
    }
}

/// Duplex WebSocket transport implementing the MCP duplex socket variant.
///
/// Outbound sends are serialized through a shared mutex (§4.3's "concurrent
/// `Send` is serialised internally" invariant); the keep-alive ping task
/// shares the same sink so a ping never interleaves mid-frame with a real
/// message.
pub struct SocketTransport {
    sink: Arc<Mutex<futures::stream::SplitSink<WsStream, Message>>>,
    stream: futures::stream::SplitStream<WsStream>,
    max_frame_size: usize,
    closed: Arc<AtomicBool>,
    ping_task: tokio::task::JoinHandle<()>,
    health: TransportHealth,
    connected_at: std::time::SystemTime,
}

impl SocketTransport {
    /// Perform the upgrade handshake and start the keep-alive ping task.
    pub async fn connect(config: SocketTransportConfig) -> Result<Self> {
        let mut request = config
            .url
            .clone()
            .into_client_request()
            .map_err(|e| TransportError::ConnectionError {
                message: format!("invalid socket url: {e}"),
            })?;

        if let Some(token) = &config.auth_token {
            let value = format!("Bearer {token}")
                .parse()
                .map_err(|e| TransportError::AuthenticationError {
                    message: format!("invalid auth token: {e}"),
                })?;
            request.headers_mut().insert("Authorization", value);
        }

        let (stream, _response) =
            connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionError {
                    message: format!("websocket handshake failed: {e}"),
                })?;

        let (sink, recv) = stream.split();
        let sink = Arc::new(Mutex::new(sink));
        let closed = Arc::new(AtomicBool::new(false));

        let ping_task = {
            let sink = sink.clone();
            let closed = closed.clone();
            let interval = config.ping_interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await; // first tick fires immediately
                loop {
                    ticker.tick().await;
                    if closed.load(Ordering::Acquire) {
                        return;
                    }
                    let mut sink = sink.lock().await;
                    if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                        return;
                    }
                }
            })
        };

        Ok(Self {
            sink,
            stream: recv,
            max_frame_size: config.max_frame_size,
            closed,
            ping_task,
            health: TransportHealth {
                state: ConnectionState::Connected,
                ..Default::default()
            },
            connected_at: std::time::SystemTime::now(),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::NotReady {
                state: ConnectionState::Disconnected,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn send_message(&mut self, message: JsonRpcMessage) -> Result<()> {
        self.ensure_open()?;

        let json = serde_json::to_string(&message).map_err(|e| {
            self.health.error_count += 1;
            TransportError::SerializationError {
                message: format!("failed to serialize message: {e}"),
            }
        })?;

        if json.len() > self.max_frame_size {
            self.health.error_count += 1;
            return Err(TransportError::MessageTooLarge {
                size: json.len(),
                limit: self.max_frame_size,
            });
        }

        trace!("sending socket frame: {json}");

        let mut sink = self.sink.lock().await;
        sink.send(Message::text(json.clone()))
            .await
            .map_err(|e| {
                self.health.error_count += 1;
                self.health.last_error = Some(e.to_string());
                TransportError::NetworkError {
                    message: format!("failed to send frame: {e}"),
                }
            })?;
        drop(sink);

        self.health.messages_sent += 1;
        self.health.last_activity = Some(std::time::SystemTime::now());
        Ok(())
    }

    async fn receive_message(&mut self) -> Result<JsonRpcMessage> {
        self.ensure_open()?;

        loop {
            let Some(frame) = self.stream.next().await else {
                self.closed.store(true, Ordering::Release);
                self.health.state = ConnectionState::Disconnected;
                return Err(TransportError::ConnectionClosed);
            };

            let frame = frame.map_err(|e| {
                self.health.error_count += 1;
                TransportError::NetworkError {
                    message: format!("socket read error: {e}"),
                }
            })?;

            match frame {
                Message::Text(text) => {
                    let text: &str = text.as_ref();
                    if text.len() > self.max_frame_size {
                        self.closed.store(true, Ordering::Release);
                        return Err(TransportError::MessageTooLarge {
                            size: text.len(),
                            limit: self.max_frame_size,
                        });
                    }
                    let message: JsonRpcMessage = serde_json::from_str(text).map_err(|e| {
                        self.health.error_count += 1;
                        TransportError::SerializationError {
                            message: format!("failed to parse frame: {e}"),
                        }
                    })?;
                    self.health.messages_received += 1;
                    self.health.last_activity = Some(std::time::SystemTime::now());
                    return Ok(message);
                }
                Message::Binary(_) => {
                    warn!("rejecting binary frame on socket transport");
                    return Err(TransportError::ProtocolError {
                        message: "binary frames are not accepted on this transport".to_string(),
                    });
                }
                Message::Ping(payload) => {
                    let mut sink = self.sink.lock().await;
                    let _ = sink.send(Message::Pong(payload)).await;
                }
                Message::Pong(_) => {
                    debug!("received keep-alive pong");
                }
                Message::Close(frame) => {
                    debug!(?frame, "peer closed socket transport");
                    self.closed.store(true, Ordering::Release);
                    self.health.state = ConnectionState::Disconnected;
                    return Err(TransportError::ConnectionClosed);
                }
                Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.ping_task.abort();
        let mut sink = self.sink.lock().await;
        let _ = sink.send(Message::Close(None)).await;
        self.health.state = ConnectionState::Disconnected;
        debug!("socket transport closed");
        Ok(())
    }

    fn get_state(&self) -> ConnectionState {
        self.health.state.clone()
    }

    fn get_health(&self) -> TransportHealth {
        let mut health = self.health.clone();
        health.connection_duration = self.connected_at.elapsed().ok();
        health
    }

    async fn shutdown(&mut self, config: crate::ShutdownConfig) -> Result<()> {
        self.health.state = ConnectionState::ShuttingDown;
        let _ = tokio::time::timeout(config.grace_period, self.close()).await;
        self.close().await
    }

    async fn force_shutdown(&mut self) -> Result<()> {
        self.ping_task.abort();
        self.closed.store(true, Ordering::Release);
        self.health.state = ConnectionState::Disconnected;
        Ok(())
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        self.ping_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_a_reasonable_frame_limit_and_ping_interval() {
        let config = SocketTransportConfig::default();
        assert!(config.max_frame_size >= 1024);
        assert!(config.ping_interval >= Duration::from_secs(1));
    }
}
