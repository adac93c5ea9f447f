//! Scenario 6 (shutdown): three enabled children, `shutdown()` completes
//! within a bounded time and every child ends up disabled and disconnected.

use std::sync::Arc;
use std::time::Duration;

use mcpgate_core::{ConnectionState, GatewayConfig};
use mcpgate_gateway::ServerManager;

#[tokio::test]
async fn shutdown_disconnects_every_enabled_child_promptly() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![
            tests::echo_child("one"),
            tests::echo_child("two"),
            tests::echo_child("three"),
        ],
    });
    for id in ["one", "two", "three"] {
        manager.enable(id).await.expect("child should connect");
    }

    tokio::time::timeout(Duration::from_secs(5), manager.shutdown())
        .await
        .expect("shutdown should complete within bound");

    for id in ["one", "two", "three"] {
        let info = manager.server_info(id).unwrap();
        assert!(!info.enabled);
        assert_eq!(info.state, ConnectionState::Disconnected);
    }
}
