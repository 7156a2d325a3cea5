//! Error types for the Discord token relay.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Result type alias using the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for token exchange requests.
///
/// The `Display` output may carry internal detail and is meant for logs only.
/// Callers only ever see the fixed message from [`Error::public_message`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request body was not valid JSON.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Request body had no authorization code.
    #[error("authorization code is missing")]
    MissingCode,

    /// Client ID or secret is not configured.
    #[error("discord client credentials are not configured")]
    MissingCredentials,

    /// Exchanging the code with Discord failed.
    #[error("token exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    /// Unsupported HTTP method for the route.
    #[error("method not allowed")]
    MethodNotAllowed,
}

/// Failures of the outbound call to Discord's token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Request could not be sent or timed out.
    #[error("request to discord failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Discord answered with something other than 200.
    #[error("discord returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response body was not a token response.
    #[error("malformed token response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response was well-formed but carried an empty access token.
    #[error("token response did not include an access token")]
    MissingAccessToken,
}

/// Uniform JSON error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl Error {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidBody(_) | Error::MissingCode | Error::Exchange(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Stable message returned to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::InvalidBody(_) => "Invalid request body",
            Error::MissingCode => "Code is required",
            Error::MissingCredentials => "Server configuration error",
            Error::Exchange(_) => "Failed to exchange code",
            Error::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.public_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidBody("EOF while parsing a value".to_string());
        assert_eq!(
            err.to_string(),
            "invalid request body: EOF while parsing a value"
        );
    }

    #[test]
    fn test_exchange_error_display() {
        let err = ExchangeError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: r#"{"error":"invalid_client"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"discord returned status 401 Unauthorized: {"error":"invalid_client"}"#
        );
    }

    #[test]
    fn test_error_from_exchange_error() {
        let err: Error = ExchangeError::MissingAccessToken.into();
        assert!(matches!(err, Error::Exchange(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::MissingCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::MissingCredentials.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            Error::from(ExchangeError::MissingAccessToken).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_public_message_hides_exchange_detail() {
        let err = Error::from(ExchangeError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "invalid_grant".to_string(),
        });
        assert_eq!(err.public_message(), "Failed to exchange code");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = Error::MissingCode.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"error":"Code is required"}"#);
    }
}
