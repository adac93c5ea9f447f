//! Domain-level error kinds, independent of any transport.

use thiserror::Error;

/// Errors that can surface from the core gateway domain.
///
/// REST and JSON-RPC surfaces each map this onto their own wire shape
/// (HTTP status / JSON-RPC code) rather than defining a second error enum.
#[derive(Debug, Error, Clone)]
pub enum GatewayError {
    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),

    #[error("unknown child: {0}")]
    UnknownChild(String),

    #[error("unknown tool: {child_id}__{tool_name}")]
    UnknownTool { child_id: String, tool_name: String },

    #[error("child not connected: {0}")]
    ChildNotConnected(String),

    #[error("failed to spawn child {child_id}: {message}")]
    Spawn { child_id: String, message: String },

    #[error("handshake with child {child_id} timed out")]
    HandshakeTimeout { child_id: String },

    #[error("protocol error from child {child_id}: {message}")]
    ProtocolError { child_id: String, message: String },

    #[error("peer error from child {child_id}: [{code}] {message}")]
    PeerError {
        child_id: String,
        code: i64,
        message: String,
    },

    #[error("peer gone: {child_id}")]
    PeerGone { child_id: String },
}

impl GatewayError {
    /// The JSON-RPC 2.0 error code this domain error maps to.
    pub fn jsonrpc_code(&self) -> i64 {
        match self {
            GatewayError::UnknownChild(_) | GatewayError::UnknownTool { .. } => -32602,
            _ => -32603,
        }
    }

    /// The HTTP status this domain error maps to for the REST facade.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::UnknownChild(_) | GatewayError::UnknownTool { .. } => 404,
            GatewayError::ChildNotConnected(_) => 409,
            GatewayError::PeerError { .. } | GatewayError::PeerGone { .. } => 500,
            GatewayError::Spawn { .. }
            | GatewayError::HandshakeTimeout { .. }
            | GatewayError::ProtocolError { .. } => 500,
            GatewayError::ConfigInvalid(_) => 500,
        }
    }
}
