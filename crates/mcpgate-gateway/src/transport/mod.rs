//! MCP Streamable-HTTP transport: the wire surface external MCP clients
//! speak, distinct from the child-facing subprotocol in `mcpgate-mcp`.

pub mod dispatcher;
pub mod http;
pub mod session;

pub use dispatcher::{Dispatcher, HttpOutcome};
