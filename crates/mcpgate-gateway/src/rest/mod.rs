//! REST facade: thin HTTP projection of the `ServerManager`.

pub mod handlers;
pub mod openapi;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::manager::ServerManager;

pub fn router(manager: Arc<ServerManager>) -> Router {
    Router::new()
        .route("/api/servers", get(handlers::list_servers))
        .route(
            "/api/servers/{id}",
            get(handlers::get_server).patch(handlers::patch_server),
        )
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/{child}/{tool}", get(handlers::get_tool))
        .route("/api/tools/{child}/{tool}", post(handlers::call_tool_api))
        .route("/tools/{child}/{tool}", post(handlers::call_tool_short))
        .route("/openapi.json", get(openapi::openapi_document))
        .with_state(manager)
}
