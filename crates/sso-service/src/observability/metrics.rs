//! Metrics definitions for the SSO service
//!
//! All metrics follow Prometheus naming conventions:
//! - `sso_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: success, error
//! - `operation`: register, login, get_user, is_admin, hash, verify
//! - `error_category`: authentication, client, internal

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return the handle used to
/// render `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder cannot be installed (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // bcrypt dominates both buckets; coarse resolution below 50ms
        .set_buckets_for_metric(
            Matcher::Prefix("sso_login_duration".to_string()),
            &[0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000],
        )
        .map_err(|e| format!("Failed to set login buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("sso_password_hash_duration".to_string()),
            &[0.050, 0.100, 0.200, 0.400, 0.800],
        )
        .map_err(|e| format!("Failed to set password hash buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record registration outcome
///
/// Metric: `sso_registrations_total`
/// Labels: `status`
pub fn record_registration(status: &str) {
    counter!("sso_registrations_total", "status" => status.to_string()).increment(1);
}

/// Record login duration and outcome
///
/// Metric: `sso_login_duration_seconds`, `sso_logins_total`
/// Labels: `status`
pub fn record_login(status: &str, duration: Duration) {
    histogram!("sso_login_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("sso_logins_total", "status" => status.to_string()).increment(1);
}

/// Record a minted session token
///
/// Metric: `sso_tokens_issued_total`
pub fn record_token_issued() {
    counter!("sso_tokens_issued_total").increment(1);
}

/// Record bcrypt operation duration
///
/// Metric: `sso_password_hash_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_password_hash_duration(operation: &str, duration: Duration) {
    histogram!("sso_password_hash_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

/// Record error by category
///
/// Metric: `sso_errors_total`
/// Labels: `operation`, `error_category`
pub fn record_error(operation: &str, error_category: &str) {
    counter!("sso_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string()
    )
    .increment(1);
}
