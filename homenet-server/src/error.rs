//! Error types for homenet-server
//!
//! Handler failures reach the browser as plain-text bodies. Relay failures
//! are not errors at this level; the AI handlers render them as HTML.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid form field or path identifier (400)
    #[error("{0}")]
    BadRequest(String),

    /// Registered path, wrong method (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Unregistered path (404)
    #[error("Not found")]
    NotFound,

    /// Store failure with its context prefix (500)
    #[error("{0}")]
    Internal(String),

    /// Page template missing or failing to execute (500)
    #[error("{0}")]
    Render(#[from] minijinja::Error),
}

impl ApiError {
    /// `Internal` with the underlying error appended, e.g. "Failed to add movie: ..."
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Internal(format!("{}{}", context, err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (status, self.to_string()).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("Title is required".into()), StatusCode::BAD_REQUEST),
            (ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (ApiError::internal("Failed to add movie: ", "disk full"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_appends_cause() {
        let err = ApiError::internal("Failed to delete TV show: ", "database is locked");
        assert_eq!(err.to_string(), "Failed to delete TV show: database is locked");
    }
}
