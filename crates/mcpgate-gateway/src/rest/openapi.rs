//! A minimal, dynamically generated OpenAPI document describing the current
//! tool catalog. Not a full OpenAPI-3.1 generator, just enough for the REST
//! facade to describe itself.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::manager::ServerManager;

pub async fn openapi_document(State(manager): State<Arc<ServerManager>>) -> Json<Value> {
    let mut paths = serde_json::Map::new();
    for (child_id, tool) in manager.all_tools() {
        let path = format!("/api/tools/{child_id}/{}", tool.name);
        paths.insert(
            path,
            json!({
                "post": {
                    "summary": tool.description,
                    "requestBody": {
                        "content": {
                            "application/json": { "schema": tool.input_schema }
                        }
                    },
                    "responses": {
                        "200": { "description": "tool result" }
                    }
                }
            }),
        );
    }

    Json(json!({
        "openapi": "3.1.0",
        "info": { "title": "mcpgate", "version": env!("CARGO_PKG_VERSION") },
        "paths": Value::Object(paths),
    }))
}
