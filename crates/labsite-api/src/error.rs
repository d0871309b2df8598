//! HTTP error responses for labsite-api

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Error response format
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid admin session
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] labsite_core::Error),
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        error: message.into(),
    });
    (status, body).into_response()
}

/// Convert internal errors to HTTP responses.
///
/// Logs the actual error server-side but returns a generic message to clients
/// to avoid leaking internal details (SQL errors, hashing faults, etc.).
pub(crate) fn internal_error(err: impl std::fmt::Display) -> Response {
    tracing::error!("Internal error: {}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            ApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            ApiError::Core(labsite_core::Error::Validation(message)) => {
                error_response(StatusCode::BAD_REQUEST, message)
            }
            ApiError::Core(err @ labsite_core::Error::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Core(err) => internal_error(err),
        }
    }
}
