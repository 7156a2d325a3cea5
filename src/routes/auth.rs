//! Discord `OAuth2` code exchange route.
//!
//! This module provides HTTP handlers for:
//! - Code exchange (`OAuth2` authorization code -> access token)
//! - Rejecting other methods on the exchange route

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    discord,
    error::{Error, Result},
    SharedState,
};

/// Create an Axum router with the auth routes.
///
/// Routes:
/// - `POST /token` - Exchange authorization code for an access token
///
/// Any other method on `/token` is answered with 405. `OPTIONS` preflights
/// never get here: the CORS layer installed by [`crate::app`] answers them.
pub fn auth_router() -> Router<SharedState> {
    Router::new().route("/token", post(exchange_code).fallback(method_not_allowed))
}

#[derive(Debug, Default, Deserialize)]
pub struct CodeExchangeRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Discord OAuth access token.
    pub access_token: String,
}

/// Exchange a Discord authorization code for an access token.
///
/// The body is parsed as JSON whatever its `Content-Type`, so browsers can
/// post it as `text/plain`.
pub async fn exchange_code(
    State(state): State<SharedState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<TokenResponse>> {
    let body = body.map_err(|rejection| {
        tracing::warn!("Failed to read token exchange request body: {}", rejection);
        Error::InvalidBody(rejection.body_text())
    })?;

    let payload = parse_request(&body).map_err(|e| {
        tracing::warn!("Rejected token exchange request body: {}", e);
        e
    })?;

    if payload.code.is_empty() {
        tracing::warn!("Token exchange request without authorization code");
        return Err(Error::MissingCode);
    }

    let discord = &state.config.discord;
    if !discord.has_credentials() {
        tracing::error!("Discord client ID or secret is not configured, refusing token exchange");
        return Err(Error::MissingCredentials);
    }

    tracing::info!("Exchanging authorization code for access token");

    let token = discord::exchange_code(&state.http_client, discord, &payload.code)
        .await
        .map_err(|e| {
            tracing::error!("Failed to exchange code with Discord: {}", e);
            Error::from(e)
        })?;

    tracing::info!("Successfully exchanged authorization code");

    Ok(Json(TokenResponse {
        access_token: token.access_token,
    }))
}

/// Read the first JSON value of the body as an exchange request.
///
/// A `null` body counts as a request without a code, and anything after the
/// first value is ignored.
fn parse_request(body: &[u8]) -> Result<CodeExchangeRequest> {
    match serde_json::Deserializer::from_slice(body)
        .into_iter::<Option<CodeExchangeRequest>>()
        .next()
    {
        Some(Ok(payload)) => Ok(payload.unwrap_or_default()),
        Some(Err(e)) => Err(Error::InvalidBody(e.to_string())),
        None => Err(Error::InvalidBody("empty request body".to_string())),
    }
}

/// Answer any method other than `POST` on the exchange route with 405.
pub async fn method_not_allowed(method: Method) -> Error {
    tracing::warn!("Method {} not allowed on token exchange route", method);
    Error::MethodNotAllowed
}
