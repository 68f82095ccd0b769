//! HTTP routes for the SSO service.
//!
//! Defines the Axum router and application state.

use crate::errors::{ApiError, AuthError};
use crate::handlers;
use crate::services::AuthService;
use axum::{
    error_handling::HandleErrorLayer,
    routing::{get, post},
    BoxError, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Authentication core.
    pub auth: AuthService,

    /// Deadline applied to every request.
    pub request_timeout: Duration,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe
/// - `/metrics` - Prometheus metrics endpoint
/// - `/api/v1/auth/register` - Register a user
/// - `/api/v1/auth/login` - Log in and receive a session token
/// - `/api/v1/users/:user_id` - Fetch a user
/// - `/api/v1/users/:user_id/admin` - Check the admin flag
/// - TraceLayer for request logging
/// - Request timeout from `AppState::request_timeout`
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let request_timeout = state.request_timeout;

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/auth/register", post(handlers::handle_register))
        .route("/api/v1/auth/login", post(handlers::handle_login))
        .route("/api/v1/users/:user_id", get(handlers::handle_get_user))
        .route("/api/v1/users/:user_id/admin", get(handlers::handle_is_admin))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // The timeout wraps the handlers; dropping the future cancels any
    // pending storage call in the core.
    api_routes
        .merge(metrics_routes)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
}

/// Convert middleware failures into the standard error body.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!(target: "sso.routes", "Request timed out");
        ApiError::Timeout
    } else {
        warn!(target: "sso.routes", error = %err, "Unhandled middleware error");
        ApiError::Auth(AuthError::Internal)
    }
}
