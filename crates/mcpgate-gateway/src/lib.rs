//! Server Manager, MCP Streamable-HTTP transport, REST facade, and
//! background auto-enable.

pub mod autoenable;
pub mod error;
pub mod manager;
pub mod rest;
pub mod server;
pub mod transport;

pub use manager::{ServerInfo, ServerManager};
pub use server::{GatewayServer, ServerConfig};
