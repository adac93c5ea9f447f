//! Tool schema and per-child catalog.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ name, description, input_schema }`; `input_schema` is an opaque
/// JSON-Schema value reproduced verbatim to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Mapping from tool name (unique within a child) to its schema.
///
/// Published by replacement: the manager swaps an `Arc<ChildCatalog>` only on
/// a successful `Connecting -> Connected` transition, so readers never
/// observe a partially populated catalog.
pub type ChildCatalog = HashMap<String, ToolSchema>;

/// Convenience constructor for an empty, shareable catalog.
pub fn empty_catalog() -> Arc<ChildCatalog> {
    Arc::new(HashMap::new())
}
