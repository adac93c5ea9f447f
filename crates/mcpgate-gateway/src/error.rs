//! Maps [`GatewayError`] onto REST responses. The JSON-RPC mapping
//! lives beside the dispatcher since it never leaves `Value`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use mcpgate_core::GatewayError;
use serde_json::json;

/// Newtype so `?` in REST handlers converts a domain error straight into an
/// HTTP response.
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
