//! Request logging and CORS.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::CorsPolicy;

/// Response header carrying the id of the request's log span.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Build the CORS layer for the configured policy.
pub fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let origin = match policy {
        CorsPolicy::AnyOrigin => AllowOrigin::any(),
        CorsPolicy::Exact(origin) => AllowOrigin::exact(origin.clone()),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Log every request with its method, path and caller address.
///
/// Everything logged while handling the request is scoped to a span tagged
/// with a fresh request id, which is echoed back in `x-request-id`.
pub async fn log_request(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("request", id = %request_id);

    tracing::info!(
        parent: &span,
        method = %request.method(),
        path = request.uri().path(),
        client = %client_addr(&request),
        "Incoming request"
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    tracing::debug!(parent: &span, status = %response.status(), "Request completed");

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

/// Caller address, preferring the first `X-Forwarded-For` hop when behind a proxy.
fn client_addr(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(addr) = forwarded {
        return addr.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_client_addr_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_addr(&request), "203.0.113.7");
    }

    #[test]
    fn test_client_addr_from_connect_info() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 40000))));
        assert_eq!(client_addr(&request), "192.0.2.1:40000");
    }

    #[test]
    fn test_client_addr_unknown() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_addr(&request), "unknown");
    }
}
