//! Error handling for the MCP server runtime.
//!
//! `MCPError` is the canonical error type returned by every fallible operation
//! in the core, transport, and server crates. Its variants follow the code
//! ranges partitioned across the JSON-RPC error space: standard JSON-RPC
//! (-32700..-32603), protocol (-32000..-32004), tool (-32100..-32105),
//! resource (-32200..-32206), prompt (-32300..-32302), auth (-32400..-32404),
//! progress/cancellation (-32500..-32503), rate limit (-32650..-32652),
//! transport (-32750..-32753), and configuration (-32800..-32803).
//!
//! `From<MCPError> for JsonRpcError` is the single place that performs this
//! mapping; handler code should never construct a `JsonRpcError` by hand.
//!
//! ```rust
//! use mcprt_core::{MCPError, MCPResult};
//!
//! fn dispatch(method: &str) -> MCPResult<()> {
//!     match method {
//!         "tools/call" => Ok(()),
//!         _ => Err(MCPError::method_not_found(method.to_string())),
//!     }
//! }
//! ```

use thiserror::Error;

pub type MCPResult<T> = Result<T, MCPError>;

#[derive(Debug, Error)]
pub enum MCPError {
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    ToolExecution(#[from] ToolError),

    #[error("{0}")]
    Resource(#[from] ResourceError),

    #[error("{0}")]
    Prompt(#[from] PromptError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Progress(#[from] ProgressError),

    #[error("{0}")]
    RateLimit(#[from] RateLimitError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Escape hatch for faults that are not a recognised protocol condition.
    /// Mapped to `InternalError` (-32603) with a correlation id; the cause is
    /// logged but never echoed back to the peer.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl MCPError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::InvalidParams(msg.into()))
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::MethodNotFound(method.into()))
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::InvalidRequest(msg.into()))
    }

    pub fn server_not_initialized(method: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::ServerNotInitialized(method.into()))
    }

    pub fn unsupported_protocol_version(requested: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::UnsupportedProtocolVersion(requested.into()))
    }

    pub fn capability_not_supported(capability: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::CapabilityNotSupported(capability.into()))
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::Other(anyhow::anyhow!(msg.into()))
    }

    pub fn invalid_tool_arguments(errors: Vec<crate::schema::ValidationIssue>) -> Self {
        Self::ToolExecution(ToolError::InvalidArguments(errors))
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolExecution(ToolError::NotFound(name.into()))
    }

    pub fn resource_not_found(uri: impl Into<String>) -> Self {
        Self::Resource(ResourceError::NotFound(uri.into()))
    }

    pub fn operation_cancelled() -> Self {
        Self::Progress(ProgressError::OperationCancelled)
    }

    pub fn operation_timeout() -> Self {
        Self::Progress(ProgressError::OperationTimeout)
    }

    pub fn request_timeout() -> Self {
        Self::operation_timeout()
    }
}

impl From<crate::protocol::jsonrpc::JsonRpcError> for MCPError {
    fn from(err: crate::protocol::jsonrpc::JsonRpcError) -> Self {
        Self::Protocol(ProtocolError::InvalidResponse(err.message))
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Server not initialized: {0} is not permitted before the Ready state")]
    ServerNotInitialized(String),

    #[error("Invalid lifecycle transition: {0}")]
    InvalidLifecycleTransition(String),

    #[error("Invalid JSON-RPC version: {0}")]
    InvalidVersion(String),

    #[error("Invalid request ID: {0}")]
    InvalidRequestId(String),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(String),

    #[error("Capability not supported: {0}")]
    CapabilityNotSupported(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Tool disabled: {0}")]
    Disabled(String),

    #[error("Invalid tool arguments")]
    InvalidArguments(Vec<crate::schema::ValidationIssue>),

    #[error("Tool concurrency limit reached for: {0}")]
    ConcurrencyLimited(String),

    #[error("Too many concurrent tool executions")]
    TooManyConcurrentTools,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Content type mismatch: expected {expected}, got {actual}")]
    ContentTypeMismatch { expected: String, actual: String },

    #[error("Resource does not support subscription: {0}")]
    SubscriptionNotSupported(String),

    #[error("No resource or template matches: {0}")]
    NoTemplateMatch(String),

    #[error("Failed to read resource {uri}: {reason}")]
    ReadFailed { uri: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),

    #[error("Invalid prompt arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to render prompt {name}: {reason}")]
    RenderFailed { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authorized: {0}")]
    AuthorizationDenied(String),
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("Operation timed out")]
    OperationTimeout,

    #[error("Unknown progress token: {0}")]
    UnknownToken(String),

    #[error("Progress token already completed: {0}")]
    AlreadyComplete(String),
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded for {identifier}, retry after {retry_after_secs}s")]
    Exceeded {
        identifier: String,
        retry_after_secs: u64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required configuration: {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection lost")]
    ConnectionLost,

    #[error("Transport is closed")]
    Closed,

    #[error("Message too large: {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("Transport I/O error: {0}")]
    Io(String),
}

/// JSON-RPC and MCP error code constants, grouped by the ranges in the data model.
pub mod error_codes {
    // Standard JSON-RPC 2.0
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Protocol
    pub const SERVER_NOT_INITIALIZED: i32 = -32000;
    pub const INVALID_LIFECYCLE_TRANSITION: i32 = -32001;
    pub const UNSUPPORTED_PROTOCOL_VERSION: i32 = -32002;
    pub const CAPABILITY_NOT_SUPPORTED: i32 = -32003;
    pub const PROTOCOL_VIOLATION: i32 = -32004;

    // Tool
    pub const TOOL_NOT_FOUND: i32 = -32100;
    pub const TOOL_EXECUTION_FAILED: i32 = -32101;
    pub const TOOL_DISABLED: i32 = -32102;
    pub const INVALID_TOOL_ARGUMENTS: i32 = -32103;
    pub const TOOL_CONCURRENCY_LIMITED: i32 = -32104;
    pub const TOO_MANY_CONCURRENT_TOOLS: i32 = -32105;

    // Resource
    pub const RESOURCE_NOT_FOUND: i32 = -32200;
    pub const RESOURCE_ACCESS_DENIED: i32 = -32201;
    pub const INVALID_RESOURCE_URI: i32 = -32202;
    pub const RESOURCE_CONTENT_MISMATCH: i32 = -32203;
    pub const RESOURCE_SUBSCRIPTION_NOT_SUPPORTED: i32 = -32204;
    pub const RESOURCE_NO_TEMPLATE_MATCH: i32 = -32205;
    pub const RESOURCE_READ_FAILED: i32 = -32206;

    // Prompt
    pub const PROMPT_NOT_FOUND: i32 = -32300;
    pub const INVALID_PROMPT_ARGUMENTS: i32 = -32301;
    pub const PROMPT_RENDER_FAILED: i32 = -32302;

    // Auth
    pub const UNAUTHENTICATED: i32 = -32400;
    pub const AUTHENTICATION_FAILED: i32 = -32401;
    pub const AUTHORIZATION_DENIED: i32 = -32402;

    // Progress / cancellation
    pub const OPERATION_CANCELLED: i32 = -32500;
    pub const OPERATION_TIMEOUT: i32 = -32501;
    pub const UNKNOWN_PROGRESS_TOKEN: i32 = -32502;
    pub const PROGRESS_ALREADY_COMPLETE: i32 = -32503;

    // Rate limit
    pub const RATE_LIMITED: i32 = -32650;

    // Transport
    pub const CONNECTION_LOST: i32 = -32750;
    pub const TRANSPORT_CLOSED: i32 = -32751;
    pub const MESSAGE_TOO_LARGE: i32 = -32752;
    pub const TRANSPORT_IO_ERROR: i32 = -32753;

    // Config
    pub const INVALID_CONFIGURATION: i32 = -32800;
    pub const MISSING_CONFIGURATION: i32 = -32801;
}

impl From<MCPError> for crate::protocol::JsonRpcError {
    fn from(err: MCPError) -> Self {
        use crate::protocol::JsonRpcError;

        match err {
            MCPError::Protocol(e) => match e {
                ProtocolError::ServerNotInitialized(method) => JsonRpcError::new(
                    error_codes::SERVER_NOT_INITIALIZED,
                    format!("Server not initialized: method '{method}' requires the Ready state"),
                ),
                ProtocolError::InvalidLifecycleTransition(msg) => {
                    JsonRpcError::new(error_codes::INVALID_LIFECYCLE_TRANSITION, msg)
                }
                ProtocolError::UnsupportedProtocolVersion(v) => JsonRpcError::new(
                    error_codes::UNSUPPORTED_PROTOCOL_VERSION,
                    format!("Unsupported protocol version: {v}"),
                ),
                ProtocolError::CapabilityNotSupported(cap) => JsonRpcError::new(
                    error_codes::CAPABILITY_NOT_SUPPORTED,
                    format!("Capability not supported: {cap}"),
                ),
                ProtocolError::MethodNotFound(method) => JsonRpcError::new(
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                ),
                ProtocolError::InvalidParams(msg) => {
                    JsonRpcError::new(error_codes::INVALID_PARAMS, format!("Invalid params: {msg}"))
                }
                ProtocolError::InvalidRequest(msg) => {
                    JsonRpcError::new(error_codes::INVALID_REQUEST, msg)
                }
                ProtocolError::InvalidResponse(msg) => {
                    JsonRpcError::new(error_codes::INVALID_REQUEST, msg)
                }
                ProtocolError::InvalidVersion(msg) => {
                    JsonRpcError::new(error_codes::INVALID_REQUEST, msg)
                }
                ProtocolError::InvalidRequestId(msg) => {
                    JsonRpcError::new(error_codes::INVALID_REQUEST, msg)
                }
            },
            MCPError::ToolExecution(e) => match e {
                ToolError::NotFound(name) => JsonRpcError::new(
                    error_codes::TOOL_NOT_FOUND,
                    format!("Tool not found: {name}"),
                ),
                ToolError::ExecutionFailed(msg) => JsonRpcError::new(
                    error_codes::TOOL_EXECUTION_FAILED,
                    format!("Tool execution failed: {msg}"),
                ),
                ToolError::Disabled(name) => JsonRpcError::new(
                    error_codes::TOOL_DISABLED,
                    format!("Tool disabled: {name}"),
                ),
                ToolError::InvalidArguments(issues) => JsonRpcError::new(
                    error_codes::INVALID_TOOL_ARGUMENTS,
                    "Invalid tool arguments".to_string(),
                )
                .with_data(serde_json::json!({ "validationErrors": issues })),
                ToolError::ConcurrencyLimited(name) => JsonRpcError::new(
                    error_codes::TOOL_CONCURRENCY_LIMITED,
                    format!("Tool concurrency limit reached for: {name}"),
                ),
                ToolError::TooManyConcurrentTools => JsonRpcError::new(
                    error_codes::TOO_MANY_CONCURRENT_TOOLS,
                    "Too many concurrent tool executions".to_string(),
                ),
            },
            MCPError::Resource(e) => match e {
                ResourceError::NotFound(uri) => JsonRpcError::new(
                    error_codes::RESOURCE_NOT_FOUND,
                    format!("Resource not found: {uri}"),
                ),
                ResourceError::AccessDenied(msg) => {
                    JsonRpcError::new(error_codes::RESOURCE_ACCESS_DENIED, msg)
                }
                ResourceError::InvalidUri(uri) => JsonRpcError::new(
                    error_codes::INVALID_RESOURCE_URI,
                    format!("Invalid URI: {uri}"),
                ),
                ResourceError::ContentTypeMismatch { expected, actual } => JsonRpcError::new(
                    error_codes::RESOURCE_CONTENT_MISMATCH,
                    format!("Content type mismatch: expected {expected}, got {actual}"),
                ),
                ResourceError::SubscriptionNotSupported(uri) => JsonRpcError::new(
                    error_codes::RESOURCE_SUBSCRIPTION_NOT_SUPPORTED,
                    format!("Resource does not support subscription: {uri}"),
                ),
                ResourceError::NoTemplateMatch(uri) => JsonRpcError::new(
                    error_codes::RESOURCE_NO_TEMPLATE_MATCH,
                    format!("No resource or template matches: {uri}"),
                ),
                ResourceError::ReadFailed { uri, reason } => JsonRpcError::new(
                    error_codes::RESOURCE_READ_FAILED,
                    format!("Failed to read resource {uri}: {reason}"),
                ),
            },
            MCPError::Prompt(e) => match e {
                PromptError::NotFound(name) => JsonRpcError::new(
                    error_codes::PROMPT_NOT_FOUND,
                    format!("Prompt not found: {name}"),
                ),
                PromptError::InvalidArguments(msg) => {
                    JsonRpcError::new(error_codes::INVALID_PROMPT_ARGUMENTS, msg)
                }
                PromptError::RenderFailed { name, reason } => JsonRpcError::new(
                    error_codes::PROMPT_RENDER_FAILED,
                    format!("Failed to render prompt {name}: {reason}"),
                ),
            },
            MCPError::Auth(e) => match e {
                AuthError::Unauthenticated => {
                    JsonRpcError::new(error_codes::UNAUTHENTICATED, "Not authenticated".to_string())
                }
                AuthError::AuthenticationFailed(reason) => JsonRpcError::new(
                    error_codes::AUTHENTICATION_FAILED,
                    "Authentication failed".to_string(),
                )
                .with_data(serde_json::json!({ "reason": reason })),
                AuthError::AuthorizationDenied(reason) => JsonRpcError::new(
                    error_codes::AUTHORIZATION_DENIED,
                    "Not authorized".to_string(),
                )
                .with_data(serde_json::json!({ "reason": reason })),
            },
            MCPError::Progress(e) => match e {
                ProgressError::OperationCancelled => JsonRpcError::new(
                    error_codes::OPERATION_CANCELLED,
                    "Operation cancelled".to_string(),
                ),
                ProgressError::OperationTimeout => JsonRpcError::new(
                    error_codes::OPERATION_TIMEOUT,
                    "Operation timed out".to_string(),
                ),
                ProgressError::UnknownToken(token) => JsonRpcError::new(
                    error_codes::UNKNOWN_PROGRESS_TOKEN,
                    format!("Unknown progress token: {token}"),
                ),
                ProgressError::AlreadyComplete(token) => JsonRpcError::new(
                    error_codes::PROGRESS_ALREADY_COMPLETE,
                    format!("Progress token already completed: {token}"),
                ),
            },
            MCPError::RateLimit(RateLimitError::Exceeded {
                identifier,
                retry_after_secs,
            }) => JsonRpcError::new(error_codes::RATE_LIMITED, "Rate limit exceeded".to_string())
                .with_data(serde_json::json!({
                    "reason": format!("rate limit exceeded for {identifier}"),
                    "retryAfter": retry_after_secs,
                })),
            MCPError::Config(e) => match e {
                ConfigError::Invalid(msg) => {
                    JsonRpcError::new(error_codes::INVALID_CONFIGURATION, msg)
                }
                ConfigError::Missing(msg) => {
                    JsonRpcError::new(error_codes::MISSING_CONFIGURATION, msg)
                }
            },
            MCPError::Transport(e) => match e {
                TransportError::ConnectionFailed(msg) => JsonRpcError::new(
                    error_codes::CONNECTION_LOST,
                    format!("Connection failed: {msg}"),
                ),
                TransportError::ConnectionLost => {
                    JsonRpcError::new(error_codes::CONNECTION_LOST, "Connection lost".to_string())
                }
                TransportError::Closed => {
                    JsonRpcError::new(error_codes::TRANSPORT_CLOSED, "Transport is closed".to_string())
                }
                TransportError::MessageTooLarge { size, limit } => JsonRpcError::new(
                    error_codes::MESSAGE_TOO_LARGE,
                    format!("Message too large: {size} bytes exceeds limit of {limit} bytes"),
                ),
                TransportError::Io(msg) => {
                    JsonRpcError::new(error_codes::TRANSPORT_IO_ERROR, format!("Transport I/O error: {msg}"))
                }
            },
            MCPError::Serialization(e) => {
                JsonRpcError::new(error_codes::PARSE_ERROR, format!("Serialization error: {e}"))
            }
            MCPError::Io(e) => JsonRpcError::new(error_codes::INTERNAL_ERROR, format!("IO error: {e}")),
            MCPError::Other(e) => {
                let correlation_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(correlation_id = %correlation_id, error = %e, "unexpected internal error");
                JsonRpcError::new(error_codes::INTERNAL_ERROR, "Internal error".to_string())
                    .with_data(serde_json::json!({ "correlationId": correlation_id }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonRpcError;

    #[test]
    fn maps_every_convenience_constructor_to_a_non_empty_message() {
        let errors = vec![
            MCPError::method_not_found("test_method"),
            MCPError::invalid_params("bad params"),
            MCPError::server_not_initialized("tools/call"),
            MCPError::internal_error("boom"),
            MCPError::operation_cancelled(),
            MCPError::operation_timeout(),
        ];
        for err in errors {
            let rpc: JsonRpcError = err.into();
            assert!(!rpc.message.is_empty());
        }
    }

    #[test]
    fn invalid_tool_arguments_carries_validation_errors_in_data() {
        let issue = crate::schema::ValidationIssue {
            path: "text".to_string(),
            message: "missing required property".to_string(),
            code: "required".to_string(),
            severity: crate::schema::Severity::Error,
        };
        let err = MCPError::invalid_tool_arguments(vec![issue]);
        let rpc: JsonRpcError = err.into();
        assert_eq!(rpc.code, error_codes::INVALID_TOOL_ARGUMENTS);
        assert!(rpc.data.is_some());
    }

    #[test]
    fn rate_limit_error_carries_retry_after() {
        let err = MCPError::RateLimit(RateLimitError::Exceeded {
            identifier: "anonymous".to_string(),
            retry_after_secs: 5,
        });
        let rpc: JsonRpcError = err.into();
        assert_eq!(rpc.code, error_codes::RATE_LIMITED);
        assert_eq!(rpc.data.unwrap()["retryAfter"], 5);
    }
}
