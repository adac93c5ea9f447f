//! JSON-RPC 2.0 wire types for the child subprotocol.
//!
//! One JSON object per line on both directions of a child's stdio; no binary
//! framing. These types are intentionally generic JSON-RPC, not MCP-specific,
//! so the same structs serialize requests sent *to* a child and deserialize
//! responses/notifications received *from* one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// An outbound JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: i64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: i64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// An outbound JSON-RPC 2.0 notification (no `id`, no response expected).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// A line received on a child's stdout: response, or a request/notification
/// originating from the child itself. This gateway only consumes responses;
/// inbound requests/notifications from children are logged and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    pub id: Option<Value>,
    pub method: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorPayload>,
}

impl InboundMessage {
    /// A response carries a non-null `id` and neither `method` is set.
    pub fn is_response(&self) -> bool {
        self.method.is_none() && self.id.is_some()
    }

    /// The integer request id this response correlates to, if parseable.
    pub fn response_id(&self) -> Option<i64> {
        self.id.as_ref().and_then(|v| v.as_i64())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The outcome delivered to a waiter once its response arrives (or the child
/// disconnects first).
#[derive(Debug, Clone)]
pub enum RpcOutcome {
    Result(Value),
    Error(JsonRpcErrorPayload),
    PeerGone,
}

// --- MCP-level shapes exchanged during handshake / tool calls ---

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    #[allow(dead_code)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(rename = "serverInfo", default)]
    pub server_info: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<mcpgate_core::ToolSchema>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, rename = "isError")]
    #[allow(dead_code)]
    pub is_error: bool,
}

/// Normalizes a child's raw `content` array: elements with a recognized
/// textual shape become `{type:"text", text:<s>}`; every other shape
/// becomes `{type:<t>, data:<stringified>}`. Applied only by the REST
/// facade, never by the MCP transport.
pub fn normalize_content(raw: &[Value]) -> Vec<ContentBlock> {
    raw.iter()
        .map(|item| {
            if let Some(text) = item.get("text").and_then(Value::as_str) {
                return ContentBlock {
                    content_type: "text".to_string(),
                    text: Some(text.to_string()),
                    data: None,
                    extra: serde_json::Map::new(),
                };
            }
            let content_type = item
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            ContentBlock {
                content_type,
                text: None,
                data: Some(item.to_string()),
                extra: serde_json::Map::new(),
            }
        })
        .collect()
}
