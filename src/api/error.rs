//! Shared error handling for API endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;

/// Login failure message. Unknown usernames and wrong passwords share it.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password";

/// API error type with automatic response conversion.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn db_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal("Database error".into())
    }

    pub fn internal_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal("Internal error".into())
    }
}

/// Extension trait mapping store errors with handler context.
pub trait ResultExt<T> {
    fn auth_err(self, context: &str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T, AuthError> {
    fn auth_err(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| match e {
            AuthError::InvalidCredentials | AuthError::NotFound => {
                ApiError::unauthorized(INVALID_LOGIN_MESSAGE)
            }
            AuthError::AlreadyExists => ApiError::conflict("Username is already taken"),
            AuthError::Unauthorized => ApiError::unauthorized("Unauthorized"),
            AuthError::StoreUnavailable(e) => ApiError::db_error(context, e),
            AuthError::Internal(msg) => ApiError::internal_error(context, msg),
        })
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
