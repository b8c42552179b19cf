use axum::http::{StatusCode, Uri};
use axum::response::Response;

use super::error_response;

/// Anything outside the download and status routes.
pub async fn not_found_handler(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "no route");
    error_response(StatusCode::NOT_FOUND, format!("no route for {}", uri.path()))
}
