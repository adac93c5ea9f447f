//! Axum routes for `POST/GET/DELETE /mcp`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;

use crate::transport::dispatcher::{Dispatcher, HttpOutcome};

const SESSION_HEADER: &str = "mcp-session-id";

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/mcp", post(handle_post).get(handle_get).delete(handle_delete))
        .with_state(dispatcher)
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

async fn handle_post(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session_id = session_header(&headers);
    match dispatcher.handle_post(session_id, &body).await {
        HttpOutcome::NewSession { session_id, body } => {
            let mut response = (StatusCode::OK, Json(body)).into_response();
            if let Ok(value) = session_id.parse() {
                response.headers_mut().insert("Mcp-Session-Id", value);
            }
            response
        }
        HttpOutcome::Response(body) => (StatusCode::OK, Json(body)).into_response(),
        HttpOutcome::Accepted => StatusCode::ACCEPTED.into_response(),
        HttpOutcome::BadRequest(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
        HttpOutcome::SessionNotFound => StatusCode::NOT_FOUND.into_response(),
        HttpOutcome::SessionDeleted => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Reserved for server-initiated streaming; not implemented in this profile.
async fn handle_get() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

async fn handle_delete(State(dispatcher): State<Arc<Dispatcher>>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_header(&headers) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match dispatcher.handle_delete(session_id) {
        HttpOutcome::SessionDeleted => StatusCode::NO_CONTENT.into_response(),
        HttpOutcome::SessionNotFound => StatusCode::NOT_FOUND.into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
