//! Configuration file loading.
//!
//! ```json
//! { "mcpServers": {
//!     "<id>": {
//!       "command": "<str>",
//!       "args": ["<str>", ...],
//!       "env":  { "<name>": "<str>", ... },
//!       "passwordCommand": { "<name>": ["<argv0>", ...], ... }
//!     }, ... } }
//! ```
//! Unknown fields are ignored. An empty `command` is accepted at parse time
//! (it produces an `Error` state on enable) but a child id containing the
//! namespace separator is rejected here, at load time.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::GatewayError;
use crate::NAMESPACE_SEPARATOR;

/// Immutable spawn descriptor for one configured child.
#[derive(Debug, Clone)]
pub struct ChildConfig {
    pub id: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    /// Maps an env-var name to the argv whose trimmed stdout supplies it.
    pub secret_commands: HashMap<String, Vec<String>>,
}

/// The whole gateway configuration: every configured child, in file order.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub children: Vec<ChildConfig>,
}

impl GatewayConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GatewayError::ConfigInvalid(format!(
                "failed to read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::parse(&raw)
    }

    /// Parses a configuration document already read into memory.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let file: ConfigFile = serde_json::from_str(raw)
            .map_err(|e| GatewayError::ConfigInvalid(format!("invalid JSON: {e}")))?;

        let mut children = Vec::with_capacity(file.mcp_servers.len());
        for (id, entry) in file.mcp_servers {
            validate_child_id(&id)?;
            children.push(ChildConfig {
                id,
                command: entry.command,
                args: entry.args,
                env: entry.env,
                secret_commands: entry.password_command,
            });
        }
        // Stable, deterministic order: JSON object key order is preserved by
        // `serde_json`'s `preserve_order` feature, so `children` is already
        // in file order.
        Ok(GatewayConfig { children })
    }
}

/// Rejects child ids that contain the namespace separator (REDESIGN FLAGS).
fn validate_child_id(id: &str) -> Result<(), GatewayError> {
    if id.is_empty() {
        return Err(GatewayError::ConfigInvalid(
            "child id must not be empty".to_string(),
        ));
    }
    if id.contains(NAMESPACE_SEPARATOR) {
        return Err(GatewayError::ConfigInvalid(format!(
            "child id {id:?} must not contain {NAMESPACE_SEPARATOR:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "mcpServers")]
    mcp_servers: HashMap<String, ConfigEntry>,
}

#[derive(Debug, Deserialize)]
struct ConfigEntry {
    #[serde(default)]
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default, rename = "passwordCommand")]
    password_command: HashMap<String, Vec<String>>,
}
