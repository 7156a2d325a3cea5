//! HTTP route handlers for the token relay.

pub mod auth;
pub mod health;

use axum::{routing::get, Router};

pub use auth::{auth_router, exchange_code};
pub use health::health;

use crate::SharedState;

/// All routes, without state or middleware applied.
///
/// - `GET /health`
/// - `/api/discord/token` (see [`auth_router`])
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/discord", auth_router())
}
