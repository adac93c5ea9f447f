//! One child MCP peer reachable over stdio: spawn, handshake,
//! tool listing, tool-call routing, and teardown.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use mcpgate_core::tool::empty_catalog;
use mcpgate_core::{ChildCatalog, ChildConfig, ConnectionState, GatewayError};
use parking_lot::Mutex as SyncMutex;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::correlator::Correlator;
use crate::protocol::{
    ContentBlock, InboundMessage, InitializeResult, JsonRpcNotification, JsonRpcRequest,
    RpcOutcome, ToolsListResult,
};
use crate::secret;

/// Default bound for how long a handshake (`initialize` + `tools/list`) may
/// take before the connect attempt is abandoned.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Recommended bound on a single line read from a child's stdout.
const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error, Clone)]
pub enum ChildSessionError {
    #[error("failed to spawn: {0}")]
    Spawn(String),
    #[error("handshake timed out")]
    HandshakeTimeout,
    #[error("protocol error: {0}")]
    ProtocolError(String),
    #[error("not connected")]
    NotConnected,
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("peer returned error [{code}]: {message}")]
    PeerError { code: i64, message: String },
    #[error("peer gone")]
    PeerGone,
}

impl ChildSessionError {
    /// Maps this child-local error onto the shared domain error, attaching
    /// the child id the caller already knows.
    pub fn into_gateway_error(self, child_id: &str) -> GatewayError {
        match self {
            ChildSessionError::Spawn(message) => GatewayError::Spawn {
                child_id: child_id.to_string(),
                message,
            },
            ChildSessionError::HandshakeTimeout => GatewayError::HandshakeTimeout {
                child_id: child_id.to_string(),
            },
            ChildSessionError::ProtocolError(message) => GatewayError::ProtocolError {
                child_id: child_id.to_string(),
                message,
            },
            ChildSessionError::NotConnected => {
                GatewayError::ChildNotConnected(child_id.to_string())
            }
            ChildSessionError::UnknownTool(tool_name) => GatewayError::UnknownTool {
                child_id: child_id.to_string(),
                tool_name,
            },
            ChildSessionError::PeerError { code, message } => GatewayError::PeerError {
                child_id: child_id.to_string(),
                code,
                message,
            },
            ChildSessionError::PeerGone => GatewayError::PeerGone {
                child_id: child_id.to_string(),
            },
        }
    }
}

struct Live {
    child: Child,
    stdin: Arc<AsyncMutex<ChildStdin>>,
    correlator: Arc<Correlator>,
    reader_handle: JoinHandle<()>,
}

struct Inner {
    status: ConnectionState,
    last_error: Option<String>,
    catalog: Arc<ChildCatalog>,
    live: Option<Live>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            status: ConnectionState::Disconnected,
            last_error: None,
            catalog: empty_catalog(),
            live: None,
        }
    }
}

/// One configured child's runtime session. See module docs.
pub struct ChildSession {
    id: String,
    handshake_timeout: Duration,
    // Serializes connect()/disconnect() sequences for this child so that
    // concurrent enable/disable calls observe a consistent final state.
    transition: AsyncMutex<()>,
    state: SyncMutex<Inner>,
}

impl ChildSession {
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Self::with_timeout(id, DEFAULT_HANDSHAKE_TIMEOUT)
    }

    pub fn with_timeout(id: impl Into<String>, handshake_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            handshake_timeout,
            transition: AsyncMutex::new(()),
            state: SyncMutex::new(Inner::default()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> ConnectionState {
        self.state.lock().status
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Snapshot of the catalog; empty unless `status() == Connected`.
    pub fn catalog(&self) -> Arc<ChildCatalog> {
        self.state.lock().catalog.clone()
    }

    /// Connects to the child if not already connected/connecting. Idempotent.
    pub async fn connect(self: &Arc<Self>, config: &ChildConfig) -> Result<(), ChildSessionError> {
        let _guard = self.transition.lock().await;

        if matches!(self.status(), ConnectionState::Connected) {
            return Ok(());
        }
        self.set_status(ConnectionState::Connecting, None);

        match self.do_connect(config).await {
            Ok((catalog, live)) => {
                let mut inner = self.state.lock();
                inner.catalog = Arc::new(catalog);
                inner.live = Some(live);
                inner.status = ConnectionState::Connected;
                inner.last_error = None;
                info!(child_id = %self.id, tools = inner.catalog.len(), "child connected");
                Ok(())
            }
            Err(err) => {
                self.set_status(ConnectionState::Error, Some(err.to_string()));
                warn!(child_id = %self.id, error = %err, "child connect failed");
                Err(err)
            }
        }
    }

    async fn do_connect(
        self: &Arc<Self>,
        config: &ChildConfig,
    ) -> Result<(ChildCatalog, Live), ChildSessionError> {
        if config.command.is_empty() {
            return Err(ChildSessionError::Spawn("empty command".to_string()));
        }

        let secrets = secret::resolve_secrets(&self.id, &config.secret_commands).await;

        debug!(child_id = %self.id, command = %config.command, "spawning child process");

        // Current environment overlaid by configured `env`, overlaid by
        // secret-command output (later layers win on name collision).
        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .envs(&config.env)
            .envs(&secrets)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| ChildSessionError::Spawn(format!("{}: {e}", config.command)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChildSessionError::Spawn("no stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChildSessionError::Spawn("no stdout handle".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            spawn_stderr_drain(self.id.clone(), stderr);
        }

        let stdin = Arc::new(AsyncMutex::new(stdin));
        let correlator = Arc::new(Correlator::new());

        let reader_handle = spawn_reader(self.clone(), stdout, correlator.clone());

        let result = self
            .handshake(&stdin, &correlator, self.handshake_timeout)
            .await;

        match result {
            Ok(catalog) => Ok((
                catalog,
                Live {
                    child,
                    stdin,
                    correlator,
                    reader_handle,
                },
            )),
            Err(err) => {
                reader_handle.abort();
                let _ = child.start_kill();
                Err(err)
            }
        }
    }

    async fn handshake(
        self: &Arc<Self>,
        stdin: &Arc<AsyncMutex<ChildStdin>>,
        correlator: &Arc<Correlator>,
        timeout: Duration,
    ) -> Result<ChildCatalog, ChildSessionError> {
        let init_params = serde_json::json!({
            "protocolVersion": mcpgate_core::PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": { "name": "mcpgate", "version": env!("CARGO_PKG_VERSION") },
        });
        let init_result: InitializeResult = self
            .request(stdin, correlator, "initialize", Some(init_params), timeout)
            .await?;
        let _ = init_result;

        self.notify(stdin, "notifications/initialized", None).await;

        let tools_result: ToolsListResult = self
            .request(stdin, correlator, "tools/list", None, timeout)
            .await?;

        let mut catalog = ChildCatalog::new();
        for tool in tools_result.tools {
            catalog.insert(tool.name.clone(), tool);
        }
        Ok(catalog)
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        stdin: &Arc<AsyncMutex<ChildStdin>>,
        correlator: &Arc<Correlator>,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<T, ChildSessionError> {
        let (id, rx) = correlator.register();
        let request = JsonRpcRequest::new(id, method, params);
        write_line(stdin, &request)
            .await
            .map_err(|e| ChildSessionError::ProtocolError(format!("write failed: {e}")))?;

        let outcome = tokio::time::timeout(timeout, rx)
            .await
            .map_err(|_| ChildSessionError::HandshakeTimeout)?
            .map_err(|_| ChildSessionError::PeerGone)?;

        match outcome {
            RpcOutcome::Result(value) => serde_json::from_value(value)
                .map_err(|e| ChildSessionError::ProtocolError(format!("bad response shape: {e}"))),
            RpcOutcome::Error(err) => Err(ChildSessionError::ProtocolError(format!(
                "[{}] {}",
                err.code, err.message
            ))),
            RpcOutcome::PeerGone => Err(ChildSessionError::PeerGone),
        }
    }

    async fn notify(&self, stdin: &Arc<AsyncMutex<ChildStdin>>, method: &str, params: Option<Value>) {
        let notification = JsonRpcNotification::new(method, params);
        if let Err(e) = write_line(stdin, &notification).await {
            warn!(child_id = %self.id, error = %e, "failed to send notification");
        }
    }

    /// Calls a tool on this child. Returns the child's `content` array
    /// verbatim (MCP transport callers) — REST callers additionally
    /// normalize it via [`crate::protocol::normalize_content`].
    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<Vec<Value>, ChildSessionError> {
        let (stdin, correlator) = {
            let inner = self.state.lock();
            if inner.status != ConnectionState::Connected {
                return Err(ChildSessionError::NotConnected);
            }
            if !inner.catalog.contains_key(tool_name) {
                return Err(ChildSessionError::UnknownTool(tool_name.to_string()));
            }
            let live = inner.live.as_ref().expect("connected implies live");
            (live.stdin.clone(), live.correlator.clone())
        };

        let (id, rx) = correlator.register();
        let request = JsonRpcRequest::new(
            id,
            "tools/call",
            Some(serde_json::json!({ "name": tool_name, "arguments": arguments })),
        );

        if let Err(e) = write_line(&stdin, &request).await {
            warn!(child_id = %self.id, error = %e, "write failed, treating as peer gone");
            self.mark_peer_gone();
            return Err(ChildSessionError::PeerGone);
        }

        match rx.await {
            Ok(RpcOutcome::Result(value)) => {
                let result: crate::protocol::ToolCallResult = serde_json::from_value(value)
                    .map_err(|e| ChildSessionError::ProtocolError(e.to_string()))?;
                Ok(result.content)
            }
            Ok(RpcOutcome::Error(err)) => Err(ChildSessionError::PeerError {
                code: err.code,
                message: err.message,
            }),
            Ok(RpcOutcome::PeerGone) | Err(_) => Err(ChildSessionError::PeerGone),
        }
    }

    /// Disconnects this child: closes stdio, reaps the subprocess, clears the
    /// catalog, and resolves all in-flight waiters with `PeerGone`. Best
    /// effort and idempotent.
    pub async fn disconnect(&self) {
        let _guard = self.transition.lock().await;
        let live = {
            let mut inner = self.state.lock();
            inner.live.take()
        };
        if let Some(mut live) = live {
            live.reader_handle.abort();
            live.correlator.fail_all_pending();
            drop(live.stdin);
            let grace = tokio::time::timeout(Duration::from_secs(2), live.child.wait()).await;
            if grace.is_err() {
                let _ = live.child.start_kill();
            }
        }
        let mut inner = self.state.lock();
        inner.status = ConnectionState::Disconnected;
        inner.last_error = None;
        inner.catalog = empty_catalog();
        info!(child_id = %self.id, "child disconnected");
    }

    fn set_status(&self, status: ConnectionState, last_error: Option<String>) {
        let mut inner = self.state.lock();
        inner.status = status;
        inner.last_error = last_error;
        if status != ConnectionState::Connected {
            inner.catalog = empty_catalog();
        }
    }

    /// Called by the reader task when the child's stdout closes unexpectedly,
    /// e.g. a peer crash mid-call.
    fn mark_peer_gone(&self) {
        let mut inner = self.state.lock();
        if inner.status == ConnectionState::Disconnected {
            return;
        }
        if let Some(live) = inner.live.take() {
            live.correlator.fail_all_pending();
        }
        inner.status = ConnectionState::Error;
        inner.last_error = Some("peer gone".to_string());
        inner.catalog = empty_catalog();
    }
}

async fn write_line<T: serde::Serialize>(
    stdin: &Arc<AsyncMutex<ChildStdin>>,
    message: &T,
) -> std::io::Result<()> {
    let mut line = serde_json::to_string(message).expect("jsonrpc envelope always serializes");
    line.push('\n');
    let mut guard = stdin.lock().await;
    guard.write_all(line.as_bytes()).await?;
    guard.flush().await
}

fn spawn_stderr_drain(child_id: String, stderr: tokio::process::ChildStderr) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let trimmed = line.trim_end();
                    if !trimmed.is_empty() {
                        debug!(child_id = %child_id, stderr = trimmed, "child stderr");
                    }
                }
            }
        }
    });
}

fn spawn_reader(
    session: Arc<ChildSession>,
    stdout: ChildStdout,
    correlator: Arc<Correlator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut buf: Vec<u8> = Vec::new();
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).await;
            match read {
                Ok(0) => break,
                Ok(_) => {
                    if buf.len() > MAX_LINE_BYTES {
                        warn!(
                            child_id = %session.id,
                            bytes = buf.len(),
                            "discarding oversized line from child"
                        );
                        continue;
                    }
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    handle_inbound_line(&session, &correlator, line);
                }
                Err(e) => {
                    warn!(child_id = %session.id, error = %e, "error reading child stdout");
                    break;
                }
            }
        }
        correlator.fail_all_pending();
        session.mark_peer_gone();
    })
}

fn handle_inbound_line(session: &Arc<ChildSession>, correlator: &Arc<Correlator>, line: &str) {
    match serde_json::from_str::<InboundMessage>(line) {
        Ok(msg) => {
            if msg.is_response() {
                if let Some(id) = msg.response_id() {
                    let outcome = if let Some(err) = msg.error {
                        RpcOutcome::Error(err)
                    } else {
                        RpcOutcome::Result(msg.result.unwrap_or(Value::Null))
                    };
                    correlator.resolve(id, outcome);
                }
            } else if let Some(method) = msg.method {
                debug!(child_id = %session.id, method, "ignoring notification/request from child");
            }
        }
        Err(e) => {
            warn!(child_id = %session.id, line, error = %e, "discarding malformed line from child");
        }
    }
}

/// Helper retained for REST callers that need the normalized content form.
pub fn normalize(raw: &[Value]) -> Vec<ContentBlock> {
    crate::protocol::normalize_content(raw)
}
