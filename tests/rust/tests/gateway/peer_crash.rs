//! Scenario 4 (peer crash): the child exits instead of answering a
//! `tools/call`. The caller sees a `PeerGone`-class error, the child's state
//! becomes `Error`, and further calls are rejected until re-enabled.

use std::sync::Arc;
use std::time::Duration;

use mcpgate_core::{ConnectionState, GatewayConfig, GatewayError};
use mcpgate_gateway::ServerManager;

#[tokio::test]
async fn crash_mid_call_marks_child_errored_and_rejects_further_calls() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::crashing_child("flaky")],
    });
    manager.enable("flaky").await.expect("flaky should connect");

    let err = manager
        .call_tool("flaky", "boom", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::PeerGone { .. }));

    let info = manager.server_info("flaky").unwrap();
    assert_eq!(info.state, ConnectionState::Error);

    let err = manager
        .call_tool("flaky", "boom", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ChildNotConnected(_)));

    manager.shutdown().await;
}
