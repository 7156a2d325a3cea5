//! Discord `OAuth2` token exchange.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{config::DiscordConfig, error::ExchangeError};

/// Form body for the `authorization_code` grant.
///
/// Client credentials travel in the form rather than a basic auth header.
#[derive(Serialize)]
struct ExchangeForm<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
}

impl<'a> ExchangeForm<'a> {
    fn new(discord: &'a DiscordConfig, code: &'a str) -> Self {
        Self {
            client_id: &discord.client_id,
            client_secret: &discord.client_secret,
            grant_type: "authorization_code",
            code,
            redirect_uri: discord.redirect_uri.as_deref().filter(|uri| !uri.is_empty()),
        }
    }
}

/// Discord `OAuth2` token response.
///
/// Only `access_token` is required; the rest is logged and then dropped.
#[derive(Deserialize)]
pub struct DiscordTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Exchange an authorization code for a Discord access token.
///
/// Makes exactly one request, bounded by `discord.exchange_timeout`.
pub async fn exchange_code(
    http_client: &reqwest::Client,
    discord: &DiscordConfig,
    code: &str,
) -> Result<DiscordTokenResponse, ExchangeError> {
    let response = http_client
        .post(&discord.token_url)
        .timeout(discord.exchange_timeout)
        .form(&ExchangeForm::new(discord, code))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if status != reqwest::StatusCode::OK {
        return Err(ExchangeError::Status { status, body });
    }

    let token: DiscordTokenResponse = serde_json::from_str(&body)?;
    if token.access_token.is_empty() {
        return Err(ExchangeError::MissingAccessToken);
    }

    tracing::debug!(
        token_type = token.token_type.as_deref().unwrap_or("unknown"),
        scope = token.scope.as_deref().unwrap_or(""),
        expires_at = ?token.expires_in.and_then(expiry_instant),
        has_refresh_token = token.refresh_token.is_some(),
        "Discord issued access token"
    );

    Ok(token)
}

/// When a token with `expires_in` seconds of lifetime expires, if representable.
fn expiry_instant(expires_in: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(expires_in)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discord_config() -> DiscordConfig {
        DiscordConfig::new("1234567890", "client-secret")
    }

    #[test]
    fn test_exchange_form_without_redirect_uri() {
        let discord = discord_config();
        let encoded = serde_urlencoded::to_string(ExchangeForm::new(&discord, "abc")).unwrap();
        assert_eq!(
            encoded,
            "client_id=1234567890&client_secret=client-secret&grant_type=authorization_code&code=abc"
        );
    }

    #[test]
    fn test_exchange_form_with_redirect_uri() {
        let mut discord = discord_config();
        discord.redirect_uri = Some("https://example.com/cb?x=1".to_string());
        let encoded = serde_urlencoded::to_string(ExchangeForm::new(&discord, "a&b")).unwrap();
        assert!(encoded.contains("code=a%26b"));
        assert!(encoded.ends_with("redirect_uri=https%3A%2F%2Fexample.com%2Fcb%3Fx%3D1"));
    }

    #[test]
    fn test_exchange_form_skips_empty_redirect_uri() {
        let mut discord = discord_config();
        discord.redirect_uri = Some(String::new());
        let encoded = serde_urlencoded::to_string(ExchangeForm::new(&discord, "abc")).unwrap();
        assert!(!encoded.contains("redirect_uri"));
    }

    #[test]
    fn test_token_response_full() {
        let json = r#"{
            "access_token": "6qrZcUqja7812RVdnEKjpzOL4CvHBFG",
            "token_type": "Bearer",
            "expires_in": 604800,
            "refresh_token": "D43f5y0ahjqew82jZ4NViEr2YafMKhue",
            "scope": "identify"
        }"#;
        let token: DiscordTokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "6qrZcUqja7812RVdnEKjpzOL4CvHBFG");
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.expires_in, Some(604800));
    }

    #[test]
    fn test_token_response_only_access_token() {
        let token: DiscordTokenResponse =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_expiry_instant() {
        let expires = expiry_instant(604800).unwrap();
        assert!(expires > Utc::now() + TimeDelta::days(6));
    }

    #[test]
    fn test_expiry_instant_out_of_range() {
        assert!(expiry_instant(i64::MAX).is_none());
        assert!(expiry_instant(i64::MIN).is_none());
        assert!(expiry_instant(i64::MAX / 1000).is_none());
    }

    #[test]
    fn test_token_response_requires_access_token() {
        let result = serde_json::from_str::<DiscordTokenResponse>(r#"{"token_type":"Bearer"}"#);
        assert!(result.is_err());
    }
}
