use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use common::error::{BucketError, DownloadError, FileHandlingError};

use crate::http_server::worker::WorkerError;
use crate::http_server::GatewayState;

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Name to offer the file under
    pub filename: Option<String>,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, DownloadHandlerError> {
    let (headers, body) = state.dispatcher().download(path, query.filename).await?;
    Ok((StatusCode::OK, headers, body).into_response())
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct DownloadHandlerError(#[from] WorkerError);

impl DownloadHandlerError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            WorkerError::Bucket(BucketError::Download(DownloadError::ForbiddenMimeType {
                ..
            })) => StatusCode::FORBIDDEN,
            WorkerError::Bucket(BucketError::Download(DownloadError::SourceMissing(_)))
            | WorkerError::Bucket(BucketError::FileHandling(FileHandlingError::PathNotFound(
                _,
            ))) => StatusCode::NOT_FOUND,
            WorkerError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DownloadHandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = if status.is_server_error() {
            tracing::error!(error = %self, "download failed");
            "download failed".to_string()
        } else {
            self.to_string()
        };
        error_response(status, msg)
    }
}
