use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub mod download;
mod not_found;

pub use not_found::not_found_handler;

/// Error body shared by every gateway route: `{"msg": ...}`.
pub(crate) fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    let body = serde_json::json!({ "msg": msg.into() });
    (status, Json(body)).into_response()
}
