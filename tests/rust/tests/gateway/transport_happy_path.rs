//! Scenario 2 (transport happy path): initialize over `POST /mcp`, reuse the
//! minted session id, list and call the namespaced tool.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mcpgate_core::GatewayConfig;
use mcpgate_gateway::transport::dispatcher::Dispatcher;
use mcpgate_gateway::transport::http;
use mcpgate_gateway::ServerManager;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post(app: &axum::Router, session_id: Option<&str>, body: Value) -> (StatusCode, Value, axum::http::HeaderMap) {
    let mut builder = Request::builder().method("POST").uri("/mcp").header("content-type", "application/json");
    if let Some(sid) = session_id {
        builder = builder.header("mcp-session-id", sid);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value, headers)
}

#[tokio::test]
async fn initialize_list_and_call_over_mcp_transport() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::echo_child("echo")],
    });
    manager.enable("echo").await.expect("echo should connect");

    let dispatcher = Arc::new(Dispatcher::new(manager.clone()));
    let app = http::router(dispatcher);

    let (status, body, headers) = post(
        &app,
        None,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"clientInfo": {"name": "t"}}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = headers
        .get("mcp-session-id")
        .expect("Mcp-Session-Id header")
        .to_str()
        .unwrap()
        .to_string();
    let _ = body;

    let (status, body, _) = post(
        &app,
        Some(&session_id),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "echo__say");

    let (status, body, _) = post(
        &app,
        Some(&session_id),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "echo__say", "arguments": {"msg": "hi"}}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["content"], json!([{"type": "text", "text": "hi"}]));

    manager.shutdown().await;
}
