//! JSON-RPC method routing for the MCP Streamable-HTTP transport.
//!
//! Transport-agnostic: this module knows nothing about axum or HTTP headers.
//! [`crate::transport::http`] extracts headers/body, calls into here, and
//! maps the resulting [`HttpOutcome`] onto an HTTP response.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::manager::ServerManager;
use crate::transport::session::McpSession;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

impl InboundEnvelope {
    fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Serialize)]
struct OutboundError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// What the transport layer should do with one inbound POST body, and the
/// HTTP status that corresponds to it.
pub enum HttpOutcome {
    /// 200, JSON-RPC result or error embedded verbatim, client's `id` preserved.
    Response(Value),
    /// 200 with `Mcp-Session-Id` set, for a successful `initialize`.
    NewSession { session_id: String, body: Value },
    /// 202, empty body (notification accepted).
    Accepted,
    /// 400, malformed envelope, parse error, or missing/unknown session.
    BadRequest(Value),
    /// 404, `DELETE /mcp` for an unknown session.
    SessionNotFound,
    /// 204, `DELETE /mcp` succeeded.
    SessionDeleted,
}

/// Owns external-client sessions and routes JSON-RPC methods to the
/// [`ServerManager`].
pub struct Dispatcher {
    manager: Arc<ServerManager>,
    sessions: DashMap<String, McpSession>,
}

impl Dispatcher {
    pub fn new(manager: Arc<ServerManager>) -> Self {
        Self {
            manager,
            sessions: DashMap::new(),
        }
    }

    /// Handles one `POST /mcp` body. `session_id` is the `Mcp-Session-Id`
    /// request header, if present.
    pub async fn handle_post(&self, session_id: Option<&str>, body: &[u8]) -> HttpOutcome {
        let envelope: InboundEnvelope = match serde_json::from_slice(body) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "malformed JSON-RPC body");
                return HttpOutcome::BadRequest(error_body(
                    Value::Null,
                    PARSE_ERROR,
                    format!("parse error: {e}"),
                ));
            }
        };

        if envelope.jsonrpc.as_deref() != Some("2.0") {
            return HttpOutcome::BadRequest(error_body(
                envelope.id.clone().unwrap_or(Value::Null),
                INVALID_REQUEST,
                "missing or invalid \"jsonrpc\" field".to_string(),
            ));
        }
        let Some(method) = envelope.method.clone() else {
            return HttpOutcome::BadRequest(error_body(
                envelope.id.clone().unwrap_or(Value::Null),
                INVALID_REQUEST,
                "missing \"method\" field".to_string(),
            ));
        };

        if method == "initialize" {
            return self.handle_initialize(&envelope).await;
        }

        // Notifications never produce a JSON-RPC response body, regardless of
        // whether a session is attached, so they bypass the session check.
        if envelope.is_notification() {
            if let Some(sid) = session_id {
                self.handle_notification(sid, &method, envelope.params);
            } else {
                debug!(method = %method, "ignoring notification with no session");
            }
            return HttpOutcome::Accepted;
        }

        // Every other method requires an existing session.
        let Some(sid) = session_id else {
            return HttpOutcome::BadRequest(error_body(
                envelope.id.clone().unwrap_or(Value::Null),
                INVALID_REQUEST,
                "missing Mcp-Session-Id header".to_string(),
            ));
        };
        if !self.sessions.contains_key(sid) {
            return HttpOutcome::BadRequest(error_body(
                envelope.id.clone().unwrap_or(Value::Null),
                INVALID_REQUEST,
                format!("unknown session: {sid}"),
            ));
        }

        let id = envelope.id.clone().unwrap_or(Value::Null);
        let result = self.dispatch_request(&method, envelope.params).await;
        match result {
            Ok(value) => HttpOutcome::Response(json!({ "jsonrpc": "2.0", "id": id, "result": value })),
            Err((code, message)) => HttpOutcome::Response(error_body(id, code, message)),
        }
    }

    /// `DELETE /mcp`: destroys the named session.
    pub fn handle_delete(&self, session_id: &str) -> HttpOutcome {
        if self.sessions.remove(session_id).is_some() {
            HttpOutcome::SessionDeleted
        } else {
            HttpOutcome::SessionNotFound
        }
    }

    async fn handle_initialize(&self, envelope: &InboundEnvelope) -> HttpOutcome {
        let client_version = envelope
            .params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let session_id = Uuid::new_v4().to_string();
        let mut session = McpSession::new(session_id.clone());
        session.client_protocol_version = client_version.clone();
        self.sessions.insert(session_id.clone(), session);

        info!(session_id = %session_id, client_protocol_version = ?client_version, "mcp session initialized");

        let id = envelope.id.clone().unwrap_or(Value::Null);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "protocolVersion": mcpgate_core::PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": "mcpgate", "version": env!("CARGO_PKG_VERSION") },
            }
        });
        HttpOutcome::NewSession { session_id, body }
    }

    fn handle_notification(&self, session_id: &str, method: &str, _params: Option<Value>) {
        match method {
            "notifications/initialized" => {
                if let Some(mut session) = self.sessions.get_mut(session_id) {
                    session.initialized = true;
                }
                debug!(session_id, "session initialized flag set");
            }
            other => {
                debug!(session_id, method = other, "ignoring notification");
            }
        }
    }

    async fn dispatch_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, (i64, String)> {
        match method {
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list()),
            "tools/call" => self.tools_call(params).await,
            other => {
                debug!(method = other, "unknown method");
                Err((METHOD_NOT_FOUND, format!("method not found: {other}")))
            }
        }
    }

    fn tools_list(&self) -> Value {
        let tools: Vec<Value> = self
            .manager
            .all_tools()
            .into_iter()
            .map(|(child_id, tool)| {
                json!({
                    "name": mcpgate_core::namespaced(&child_id, &tool.name),
                    "description": format!("[{}] {}", child_id, tool.description),
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<Value, (i64, String)> {
        let params = params.ok_or((INVALID_PARAMS, "missing params".to_string()))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or((INVALID_PARAMS, "missing \"name\"".to_string()))?;
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let (child_id, tool_name) = mcpgate_core::split_namespaced(name)
            .ok_or((INVALID_PARAMS, format!("not a namespaced tool name: {name}")))?;

        self.manager
            .call_tool(child_id, tool_name, arguments)
            .await
            .map(|content| json!({ "content": content }))
            .map_err(|e| (e.jsonrpc_code(), e.to_string()))
    }
}

fn error_body(id: Value, code: i64, message: String) -> Value {
    let error = OutboundError {
        code,
        message,
        data: None,
    };
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}
