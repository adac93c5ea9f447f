//! Boundary behaviors not covered by the numbered scenarios.

use std::sync::Arc;
use std::time::Duration;

use mcpgate_core::GatewayConfig;
use mcpgate_gateway::ServerManager;

/// A malformed line between two valid responses must not break correlation
/// of the valid responses around it.
#[tokio::test]
async fn malformed_line_between_responses_does_not_break_correlation() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::flaky_child("flaky")],
    });
    manager.enable("flaky").await.expect("connect should succeed despite the garbage line");

    let content = manager
        .call_tool("flaky", "say", serde_json::json!({"msg": "still here"}))
        .await
        .expect("call after the garbage line should still correlate");
    assert_eq!(content[0]["text"], "still here");

    manager.shutdown().await;
}

/// `enable(c); enable(c)` observably equals `enable(c)`: the second call is
/// a no-op success against an already-connected child.
#[tokio::test]
async fn repeated_enable_is_idempotent() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::echo_child("echo")],
    });
    manager.enable("echo").await.expect("first enable should connect");
    manager.enable("echo").await.expect("second enable should be a no-op success");

    let info = manager.server_info("echo").unwrap();
    assert!(info.enabled);
    assert_eq!(info.state, mcpgate_core::ConnectionState::Connected);

    manager.shutdown().await;
}

/// `enable(c); disable(c); enable(c)` reconnects a reachable child.
#[tokio::test]
async fn disable_then_enable_reconnects() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::echo_child("echo")],
    });
    manager.enable("echo").await.expect("enable should connect");
    manager.disable("echo").await.expect("disable should succeed");
    manager
        .call_tool("echo", "say", serde_json::json!({}))
        .await
        .expect_err("a disabled child must reject calls");

    manager.enable("echo").await.expect("re-enable should reconnect");
    let content = manager
        .call_tool("echo", "say", serde_json::json!({"msg": "back"}))
        .await
        .expect("call after reconnect should succeed");
    assert_eq!(content[0]["text"], "back");

    manager.shutdown().await;
}
