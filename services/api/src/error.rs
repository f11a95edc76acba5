use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use importer::ImportError;
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler failure rendered as `{ "error": ... }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("{:#}", e);
        Self::internal("Internal server error")
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        error!("Error importing CSV: {}", e);
        Self::internal(e.to_string())
    }
}
