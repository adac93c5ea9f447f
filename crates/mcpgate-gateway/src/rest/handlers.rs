//! Handlers for the REST facade.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::manager::ServerManager;

pub async fn list_servers(State(manager): State<Arc<ServerManager>>) -> Json<Value> {
    let servers: Vec<_> = manager
        .server_ids()
        .into_iter()
        .filter_map(|id| manager.server_info(&id))
        .collect();
    Json(json!({ "servers": servers }))
}

pub async fn get_server(
    State(manager): State<Arc<ServerManager>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    manager
        .server_info(&id)
        .map(|info| Json(json!(info)))
        .ok_or_else(|| mcpgate_core::GatewayError::UnknownChild(id).into())
}

#[derive(Debug, Deserialize)]
pub struct PatchServerRequest {
    pub enabled: bool,
}

pub async fn patch_server(
    State(manager): State<Arc<ServerManager>>,
    Path(id): Path<String>,
    Json(body): Json<PatchServerRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.enabled {
        manager.enable(&id).await?;
    } else {
        manager.disable(&id).await?;
    }
    let info = manager
        .server_info(&id)
        .expect("id just validated by enable/disable");
    Ok(Json(json!(info)))
}

pub async fn list_tools(State(manager): State<Arc<ServerManager>>) -> Json<Value> {
    let tools: Vec<Value> = manager
        .all_tools()
        .into_iter()
        .map(|(child_id, tool)| {
            json!({
                "childId": child_id,
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect();
    Json(json!({ "tools": tools }))
}

pub async fn get_tool(
    State(manager): State<Arc<ServerManager>>,
    Path((child, tool)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    manager
        .tool_schema(&child, &tool)
        .map(|schema| Json(json!(schema)))
        .ok_or_else(|| {
            mcpgate_core::GatewayError::UnknownTool {
                child_id: child,
                tool_name: tool,
            }
            .into()
        })
}

/// Accepts either `{"arguments": {...}}` or a bare arguments object.
fn extract_arguments(body: Value) -> Value {
    match body {
        Value::Object(ref map) if map.contains_key("arguments") => {
            map.get("arguments").cloned().unwrap_or(json!({}))
        }
        other => other,
    }
}

async fn call_tool(
    manager: Arc<ServerManager>,
    child: String,
    tool: String,
    body: Value,
) -> Result<Json<Value>, ApiError> {
    let arguments = extract_arguments(body);
    let content = manager.call_tool(&child, &tool, arguments).await?;
    let normalized: Vec<Value> = mcpgate_mcp::child_session::normalize(&content)
        .into_iter()
        .map(|block| serde_json::to_value(block).unwrap_or(Value::Null))
        .collect();
    Ok(Json(json!({ "content": normalized })))
}

pub async fn call_tool_api(
    State(manager): State<Arc<ServerManager>>,
    Path((child, tool)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    call_tool(manager, child, tool, body.map(|b| b.0).unwrap_or(json!({}))).await
}

pub async fn call_tool_short(
    State(manager): State<Arc<ServerManager>>,
    Path((child, tool)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    call_tool(manager, child, tool, body.map(|b| b.0).unwrap_or(json!({}))).await
}
