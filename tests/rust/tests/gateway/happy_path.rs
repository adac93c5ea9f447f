//! Scenario 1 (happy path): enable one child, call its tool through the REST
//! facade, get back normalized content.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mcpgate_core::GatewayConfig;
use mcpgate_gateway::rest;
use mcpgate_gateway::ServerManager;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn enable_then_call_returns_normalized_text() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::echo_child("echo")],
    });
    manager.enable("echo").await.expect("echo should connect");

    let app = rest::router(manager.clone());
    let body = json!({"arguments": {"msg": "hi"}});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tools/echo/say")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["content"], json!([{"type": "text", "text": "hi"}]));

    manager.shutdown().await;
}
