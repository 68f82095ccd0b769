//! Registration and login handlers.
//!
//! Requests are checked for required fields here; everything else is the
//! authentication core's job. Missing and empty fields are treated alike.

use crate::crypto::MAX_PASSWORD_BYTES;
use crate::errors::ApiError;
use crate::models::{LoginResponse, RegisterResponse};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub app_id: i32,
    #[serde(default)]
    pub username: String,
}

/// Return the password if present and non-empty.
fn required_password(password: &Option<SecretString>) -> Result<&str, ApiError> {
    password
        .as_ref()
        .map(|p| p.expose_secret())
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::Validation("password is required"))
}

fn validate_register(req: &RegisterRequest) -> Result<&str, ApiError> {
    if req.email.is_empty() {
        return Err(ApiError::Validation("email is required"));
    }
    if req.username.is_empty() {
        return Err(ApiError::Validation("username is required"));
    }
    let password = required_password(&req.password)?;
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::Validation("password is too long"));
    }
    Ok(password)
}

fn validate_login(req: &LoginRequest) -> Result<&str, ApiError> {
    if req.email.is_empty() && req.username.is_empty() {
        return Err(ApiError::Validation("email or username is required"));
    }
    let password = required_password(&req.password)?;
    if req.app_id == 0 {
        return Err(ApiError::Validation("app_id is required"));
    }
    Ok(password)
}

/// Handle user registration
///
/// POST /api/v1/auth/register
#[instrument(skip_all, name = "sso.handlers.register")]
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(payload) = payload?;
    let password = validate_register(&payload)?;

    let user_id = state
        .auth
        .register_new_user(&payload.email, password, &payload.username)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// Handle login
///
/// POST /api/v1/auth/login
#[instrument(skip_all, name = "sso.handlers.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let password = validate_login(&payload)?;

    let token = state
        .auth
        .login(&payload.email, password, payload.app_id, &payload.username)
        .await?;

    Ok(Json(LoginResponse { token }))
}
