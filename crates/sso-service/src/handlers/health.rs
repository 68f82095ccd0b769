//! Liveness probe handler.

/// Returns "OK" while the process is serving requests.
///
/// Does not touch storage; a failing probe means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}
