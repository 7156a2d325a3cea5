//! Configuration types for the Discord token relay.

use std::{fmt, time::Duration};

use axum::http::HeaderValue;

/// Discord's `OAuth2` token endpoint.
pub const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

/// Upper bound on a single token exchange request.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Root configuration for the relay.
///
/// Built once at startup and shared read-only through [`crate::AppState`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord `OAuth2` configuration.
    pub discord: DiscordConfig,
    /// Server configuration.
    pub server: ServerConfig,
}

/// Discord `OAuth2` client configuration.
///
/// Credentials may be empty: the relay still starts so that `/health` keeps
/// answering, and the exchange endpoint refuses to run until they are set.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Discord application client ID.
    pub client_id: String,
    /// Discord application client secret.
    pub client_secret: String,
    /// `OAuth2` redirect URI, sent with the exchange only when present.
    pub redirect_uri: Option<String>,
    /// Token endpoint the authorization code is exchanged against.
    pub token_url: String,
    /// Timeout for the outbound exchange request.
    pub exchange_timeout: Duration,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Which origins browsers may call the relay from.
    pub cors: CorsPolicy,
}

/// Cross-origin policy applied to every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// `Access-Control-Allow-Origin: *`
    #[default]
    AnyOrigin,
    /// Only the given origin is allowed.
    Exact(HeaderValue),
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsPolicy::default(),
        }
    }
}

impl DiscordConfig {
    /// Create a configuration for the public Discord token endpoint.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            token_url: DISCORD_TOKEN_URL.to_string(),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// Returns true when both the client ID and secret are set.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_secret(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("exchange_timeout", &self.exchange_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Expected environment variables:
    /// - `DISCORD_CLIENT_ID`
    /// - `DISCORD_CLIENT_SECRET`
    /// - `DISCORD_REDIRECT_URI` (optional)
    /// - `DISCORD_TOKEN_URL` (optional, defaults to Discord's token endpoint)
    /// - `DISCORD_EXCHANGE_TIMEOUT_SECS` (optional, defaults to 10)
    /// - `CORS_ALLOWED_ORIGIN` (optional, defaults to any origin)
    /// - `HOST` (optional, defaults to "0.0.0.0")
    /// - `PORT` (optional, defaults to 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let exchange_timeout = match var("DISCORD_EXCHANGE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidEnv("DISCORD_EXCHANGE_TIMEOUT_SECS", raw))?,
            None => DEFAULT_EXCHANGE_TIMEOUT,
        };

        let discord = DiscordConfig {
            client_id: var("DISCORD_CLIENT_ID").unwrap_or_default(),
            client_secret: var("DISCORD_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: var("DISCORD_REDIRECT_URI"),
            token_url: var("DISCORD_TOKEN_URL").unwrap_or_else(|| DISCORD_TOKEN_URL.to_string()),
            exchange_timeout,
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnv("PORT", raw))?,
            None => default_port(),
        };

        let cors = match var("CORS_ALLOWED_ORIGIN") {
            Some(origin) if origin == "*" => CorsPolicy::AnyOrigin,
            Some(origin) => HeaderValue::from_str(&origin)
                .map(CorsPolicy::Exact)
                .map_err(|_| ConfigError::InvalidEnv("CORS_ALLOWED_ORIGIN", origin))?,
            None => CorsPolicy::AnyOrigin,
        };

        let server = ServerConfig {
            host: var("HOST").unwrap_or_else(default_host),
            port,
            cors,
        };

        Ok(Self { discord, server })
    }
}

/// Mask a secret for logging, keeping only its first and last four characters.
///
/// Values too short to mask meaningfully are hidden entirely.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {0}: {1:?}")]
    InvalidEnv(&'static str, String),
}
