//! Scenario 5 (parallel fan-out): two enabled children, 50 concurrent tool
//! calls split across both; every call completes and each response still
//! carries the argument its own caller sent.

use std::sync::Arc;
use std::time::Duration;

use mcpgate_core::GatewayConfig;
use mcpgate_gateway::ServerManager;
use tokio::task::JoinSet;

#[tokio::test]
async fn fifty_concurrent_calls_all_correlate() {
    let Some(_python) = tests::require_python() else {
        return;
    };

    let manager = Arc::new(ServerManager::new(Duration::from_secs(5)));
    manager.load_config(GatewayConfig {
        children: vec![tests::echo_child("a"), tests::echo_child("b")],
    });
    manager.enable("a").await.expect("a should connect");
    manager.enable("b").await.expect("b should connect");

    let mut calls = JoinSet::new();
    for i in 0..50u32 {
        let manager = manager.clone();
        let child = if i % 2 == 0 { "a" } else { "b" };
        calls.spawn(async move {
            let msg = format!("call-{i}");
            let content = manager
                .call_tool(child, "say", serde_json::json!({"msg": msg}))
                .await
                .expect("call should succeed");
            (msg, content)
        });
    }

    let mut seen = 0;
    while let Some(result) = calls.join_next().await {
        let (msg, content) = result.expect("task should not panic");
        assert_eq!(content[0]["text"], msg);
        seen += 1;
    }
    assert_eq!(seen, 50);

    manager.shutdown().await;
}
