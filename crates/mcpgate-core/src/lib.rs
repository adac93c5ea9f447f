//! Domain types shared across the mcpgate workspace: child configuration,
//! the tool catalog, connection state, and the common error enum.

pub mod config;
pub mod error;
pub mod tool;

pub use config::{ChildConfig, GatewayConfig};
pub use error::GatewayError;
pub use tool::{ChildCatalog, ToolSchema};

/// Separator used to namespace a child's tools in externally-visible names:
/// `<child_id>__<tool_name>`.
pub const NAMESPACE_SEPARATOR: &str = "__";

/// The MCP protocol version this gateway advertises to external clients.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Runtime connection status of one configured child.
///
/// Exactly one of these holds at any time; transitions are driven only by the
/// Server Manager (see `mcpgate-gateway::manager`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}

/// Splits an externally-visible namespaced tool name `<child_id>__<tool_name>`
/// at the *first* occurrence of [`NAMESPACE_SEPARATOR`].
///
/// Returns `None` if the separator does not occur at all. Child ids are
/// rejected at config load if they themselves contain the separator (see
/// [`config::validate_child_id`]), so the first-split here is unambiguous.
pub fn split_namespaced(name: &str) -> Option<(&str, &str)> {
    name.split_once(NAMESPACE_SEPARATOR)
}

/// Builds the externally-visible namespaced tool name for a child's tool.
pub fn namespaced(child_id: &str, tool_name: &str) -> String {
    format!("{child_id}{NAMESPACE_SEPARATOR}{tool_name}")
}
