//! The child-process MCP subprotocol: JSON-RPC wire types, secret
//! resolution, request correlation, and the `ChildSession` that ties them
//! together.

pub mod child_session;
pub mod correlator;
pub mod protocol;
pub mod secret;

pub use child_session::{ChildSession, ChildSessionError};
pub use correlator::Correlator;
