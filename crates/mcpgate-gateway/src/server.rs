//! Assembles the transport and REST routers into one axum `Router` and owns
//! the top-level run loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::autoenable;
use crate::manager::ServerManager;
use crate::transport::dispatcher::Dispatcher;
use crate::{rest, transport};
use mcpgate_core::GatewayConfig;

/// Runtime configuration for the gateway's HTTP listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7890,
            enable_cors: true,
            handshake_timeout: mcpgate_mcp::child_session::DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("invalid host/port")
    }
}

/// Owns the manager and serves both transports until cancelled.
pub struct GatewayServer {
    config: ServerConfig,
    manager: Arc<ServerManager>,
}

impl GatewayServer {
    pub fn new(config: ServerConfig, child_config: GatewayConfig) -> Self {
        let manager = Arc::new(ServerManager::new(config.handshake_timeout));
        manager.load_config(child_config);
        Self { config, manager }
    }

    pub fn manager(&self) -> Arc<ServerManager> {
        self.manager.clone()
    }

    fn build_router(&self) -> Router {
        let dispatcher = Arc::new(Dispatcher::new(self.manager.clone()));

        let mut router = Router::new()
            .merge(transport::http::router(dispatcher))
            .merge(rest::router(self.manager.clone()))
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router
    }

    /// Starts the background auto-enable loop, then serves until `shutdown`
    /// resolves. On return, the auto-enable loop is cancelled and every
    /// child is disconnected.
    pub async fn run(self, shutdown: impl std::future::Future<Output = ()>) -> anyhow::Result<()> {
        let addr = self.config.addr();
        let auto_enable = autoenable::spawn(self.manager.clone());

        let router = self.build_router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "mcpgate listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("shutting down");
        auto_enable.cancel_and_join().await;
        self.manager.shutdown().await;
        Ok(())
    }
}
