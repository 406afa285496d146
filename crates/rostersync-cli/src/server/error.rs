//! API error types and handling.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use rostersync::{SyncError, SyncResult};

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Unknown session or missing sync log.
    NotFound(String),
    /// Bad request from client.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
    /// Error from the rostersync library.
    Sync(SyncError),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    /// Operations applied before the store went away.
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<SyncResult>,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Sync(e) => {
                let status = match e {
                    SyncError::Parse(_) | SyncError::Csv(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    SyncError::Configuration(_) | SyncError::Json(_) => StatusCode::BAD_REQUEST,
                    SyncError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    SyncError::Io { .. } | SyncError::Roster(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.kind())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let (message, results) = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                (msg, None)
            }
            ApiError::Sync(e) => (e.to_string(), e.partial_result().cloned()),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: kind.to_string(),
                message,
                results,
            }),
        )
            .into_response()
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        ApiError::Sync(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Sync(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}
