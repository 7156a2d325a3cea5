//! Liveness check.

use axum::http::StatusCode;

/// Always answers `200 OK`, whatever the configuration state.
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
