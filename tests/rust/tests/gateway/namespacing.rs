//! Scenario 3 (namespacing error): a `tools/call` name with no `__` maps to
//! JSON-RPC `-32602`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mcpgate_gateway::transport::dispatcher::Dispatcher;
use mcpgate_gateway::transport::http;
use mcpgate_gateway::ServerManager;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn unnamespaced_tool_call_is_invalid_params_over_http() {
    let manager = Arc::new(ServerManager::new(Duration::from_secs(1)));
    let dispatcher = Arc::new(Dispatcher::new(manager));
    let app = http::router(dispatcher);

    let init = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}))
                        .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let session_id = init
        .headers()
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .header("mcp-session-id", session_id)
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "jsonrpc": "2.0",
                        "id": 2,
                        "method": "tools/call",
                        "params": {"name": "badname", "arguments": {}},
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["error"]["code"], -32602);
}
