//! End-to-end scenarios exercising the gateway through the REST facade, the
//! MCP Streamable-HTTP transport, and the `ServerManager` directly.

mod boundary;
mod fan_out;
mod happy_path;
mod namespacing;
mod peer_crash;
mod shutdown;
mod transport_happy_path;
