//! MCP transport sessions: one per external client, minted by `initialize`.

/// Tracks the handshake state of one external MCP client connection.
#[derive(Debug, Clone)]
pub struct McpSession {
    pub id: String,
    pub initialized: bool,
    pub client_protocol_version: Option<String>,
}

impl McpSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initialized: false,
            client_protocol_version: None,
        }
    }
}
