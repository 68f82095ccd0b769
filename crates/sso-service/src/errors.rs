use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Outcome taxonomy of the authentication core.
///
/// Every collaborator failure is classified into exactly one of these kinds
/// before it leaves the core. None of the variants carry storage or library
/// detail; that detail is logged where the failure is classified.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email/username or wrong password. The two cases are merged
    /// so callers cannot probe for account existence.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("User not found")]
    UserNotFound,

    /// Returned by the admin check when the user does not exist.
    #[error("Invalid app ID")]
    InvalidAppId,

    #[error("Internal error")]
    Internal,
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed shape validation before reaching the core.
    #[error("Invalid request: {0}")]
    Validation(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request exceeded its deadline.
    #[error("Request timed out")]
    Timeout,
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        ApiError::Validation("request body is malformed")
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::Validation("user_id must be an integer")
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", *message),
            ApiError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ),
            ApiError::Auth(AuthError::UserExists) => {
                (StatusCode::CONFLICT, "USER_EXISTS", "User already exists")
            }
            ApiError::Auth(AuthError::UserNotFound) => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found")
            }
            ApiError::Auth(AuthError::InvalidAppId) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "Invalid argument")
            }
            ApiError::Auth(AuthError::Internal) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred",
            ),
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
                "Request timed out",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::Auth(self).into_response()
    }
}
