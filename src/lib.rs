//! Discord Token Relay
//!
//! A small service that exchanges Discord `OAuth2` authorization codes for
//! access tokens on behalf of browser clients, so the client secret never
//! leaves the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use discord_token_relay::{app, AppState, Config};
//! use std::{net::SocketAddr, sync::Arc};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     dotenvy::dotenv().ok();
//!     let config = Config::from_env()?;
//!     let state = Arc::new(AppState::new(config));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(
//!         listener,
//!         app(state).into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod discord;
pub mod error;
pub mod middleware;
pub mod routes;

// Re-exports for convenience
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

pub use config::{mask_secret, Config, ConfigError, CorsPolicy, DiscordConfig, ServerConfig};
pub use error::{Error, ExchangeError, Result};

/// Application state containing configuration and the outbound HTTP client.
///
/// This is designed to be wrapped in `Arc` and used with Axum's state extractor.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// HTTP client for Discord API requests.
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Create a new AppState with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create a new AppState with a custom HTTP client.
    pub fn with_http_client(config: Config, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

/// Type alias for Arc-wrapped AppState, commonly used with Axum.
pub type SharedState = Arc<AppState>;

/// Build the complete application: routes, request logging and CORS.
pub fn app(state: SharedState) -> Router {
    let cors = middleware::cors_layer(&state.config.server.cors);

    routes::router()
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_request))
                .layer(cors),
        )
        .with_state(state)
}
