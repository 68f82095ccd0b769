//! Identity query handlers.

use crate::errors::ApiError;
use crate::models::{IsAdminResponse, UserProfile};
use crate::routes::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

fn validate_user_id(user_id: i64) -> Result<i64, ApiError> {
    if user_id == 0 {
        return Err(ApiError::Validation("user_id is required"));
    }
    Ok(user_id)
}

/// Handle user lookup
///
/// GET /api/v1/users/:user_id
#[instrument(skip_all, name = "sso.handlers.get_user")]
pub async fn handle_get_user(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let Path(user_id) = user_id?;
    let user_id = validate_user_id(user_id)?;
    let profile = state.auth.get_user(user_id).await?;
    Ok(Json(profile))
}

/// Handle admin check
///
/// GET /api/v1/users/:user_id/admin
#[instrument(skip_all, name = "sso.handlers.is_admin")]
pub async fn handle_is_admin(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<IsAdminResponse>, ApiError> {
    let Path(user_id) = user_id?;
    let user_id = validate_user_id(user_id)?;
    let is_admin = state.auth.is_admin(user_id).await?;
    Ok(Json(IsAdminResponse { is_admin }))
}
