//! Server Manager: catalog of configured children, enabled-set,
//! lifecycle orchestration, fan-in of tool listings, tool-call routing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use mcpgate_core::{ChildConfig, ConnectionState, GatewayConfig, GatewayError, ToolSchema};
use mcpgate_mcp::ChildSession;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// `{id, state, enabled, tool_names, last_error}`.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub id: String,
    pub state: ConnectionState,
    pub enabled: bool,
    pub tool_names: Vec<String>,
    pub last_error: Option<String>,
}

/// Central orchestrator owning every child's runtime state; the only
/// component permitted to mutate it.
pub struct ServerManager {
    configs: DashMap<String, ChildConfig>,
    // Stable, config-file order.
    order: RwLock<Vec<String>>,
    // Created lazily on first `enable`; one session per configured id for
    // the lifetime of the process, so at most one subprocess exists per
    // child id at any moment.
    sessions: DashMap<String, Arc<ChildSession>>,
    enabled: RwLock<HashSet<String>>,
    handshake_timeout: Duration,
}

impl ServerManager {
    pub fn new(handshake_timeout: Duration) -> Self {
        Self {
            configs: DashMap::new(),
            order: RwLock::new(Vec::new()),
            sessions: DashMap::new(),
            enabled: RwLock::new(HashSet::new()),
            handshake_timeout,
        }
    }

    /// Populates `ChildConfig` records from a parsed configuration document.
    /// Intended to be called once at startup.
    pub fn load_config(&self, config: GatewayConfig) {
        self.configs.clear();
        let mut order = self.order.write();
        order.clear();
        for child in config.children {
            order.push(child.id.clone());
            self.configs.insert(child.id.clone(), child);
        }
    }

    /// Stable order (config file order).
    pub fn server_ids(&self) -> Vec<String> {
        self.order.read().clone()
    }

    pub fn server_info(&self, id: &str) -> Option<ServerInfo> {
        let _config = self.configs.get(id)?;
        let enabled = self.enabled.read().contains(id);
        let session = self.sessions.get(id);
        let (state, tool_names, last_error) = match session {
            Some(session) => {
                let mut names: Vec<String> = session.catalog().keys().cloned().collect();
                names.sort();
                (session.status(), names, session.last_error())
            }
            None => (ConnectionState::Disconnected, Vec::new(), None),
        };
        Some(ServerInfo {
            id: id.to_string(),
            state,
            enabled,
            tool_names,
            last_error,
        })
    }

    fn session_for(&self, id: &str) -> Arc<ChildSession> {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| ChildSession::with_timeout(id.to_string(), self.handshake_timeout))
            .clone()
    }

    /// Adds `id` to the enabled-set and attempts to connect it. Idempotent:
    /// calling `enable` on an already-`Connected` child is a no-op success.
    /// Returns `Ok(())` iff the child is `Connected` when this returns.
    pub async fn enable(&self, id: &str) -> Result<(), GatewayError> {
        let config = self
            .configs
            .get(id)
            .map(|c| c.clone())
            .ok_or_else(|| GatewayError::UnknownChild(id.to_string()))?;

        self.enabled.write().insert(id.to_string());

        let session = self.session_for(id);
        session
            .connect(&config)
            .await
            .map_err(|e| e.into_gateway_error(id))
    }

    /// Removes `id` from the enabled-set and disconnects it. Idempotent;
    /// best-effort.
    pub async fn disable(&self, id: &str) -> Result<(), GatewayError> {
        if !self.configs.contains_key(id) {
            return Err(GatewayError::UnknownChild(id.to_string()));
        }
        self.enabled.write().remove(id);
        if let Some(session) = self.sessions.get(id) {
            session.disconnect().await;
        }
        Ok(())
    }

    /// Enumerates `Connected` children only, deterministic ordering
    /// (child id in config order, then tool name).
    pub fn all_tools(&self) -> Vec<(String, ToolSchema)> {
        let mut out = Vec::new();
        for id in self.server_ids() {
            let Some(session) = self.sessions.get(&id) else {
                continue;
            };
            if session.status() != ConnectionState::Connected {
                continue;
            }
            let catalog = session.catalog();
            let mut names: Vec<&String> = catalog.keys().collect();
            names.sort();
            for name in names {
                out.push((id.clone(), catalog[name].clone()));
            }
        }
        out
    }

    pub fn tool_schema(&self, child_id: &str, tool_name: &str) -> Option<ToolSchema> {
        let session = self.sessions.get(child_id)?;
        session.catalog().get(tool_name).cloned()
    }

    /// Routes a tool call to the named child.
    pub async fn call_tool(
        &self,
        child_id: &str,
        tool_name: &str,
        args: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        if !self.configs.contains_key(child_id) {
            return Err(GatewayError::UnknownChild(child_id.to_string()));
        }
        let session = self
            .sessions
            .get(child_id)
            .ok_or_else(|| GatewayError::ChildNotConnected(child_id.to_string()))?
            .clone();
        session
            .call_tool(tool_name, args)
            .await
            .map_err(|e| e.into_gateway_error(child_id))
    }

    /// Best-effort disconnect of every child; clears the enabled-set.
    /// Individual child errors never propagate.
    pub async fn shutdown(&self) {
        let ids = self.server_ids();
        for id in ids {
            if let Some(session) = self.sessions.get(&id) {
                session.disconnect().await;
            }
        }
        self.enabled.write().clear();
        info!("server manager shut down");
    }

    #[cfg(test)]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.read().contains(id)
    }
}
