use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::AppError;

/// HTTP-facing error. Internal failures never leak details or partial data.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Service error")]
    Internal,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "not_found",
            ApiError::BadRequest { .. } => "invalid_argument",
            ApiError::ServiceUnavailable => "unavailable",
            ApiError::Internal => "internal",
        }
    }
}

impl ApiError {
    /// Parse a path identifier, rejecting malformed ids with a JSON 400
    pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
        Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest {
            message: format!("{} id '{}' is not a valid UUID", what, raw),
        })
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(resource) => ApiError::NotFound { resource },
            AppError::InvalidInput(message) => ApiError::BadRequest { message },
            AppError::ServiceUnavailable(reason) => {
                tracing::warn!(%reason, "request rejected, service unavailable");
                ApiError::ServiceUnavailable
            }
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}
