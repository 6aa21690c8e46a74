use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::ALLOW},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::errors::{ApiError, json_error};

/// Header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Pull the session token out of the request headers.
///
/// `x-auth-token` wins; `Authorization: Bearer <token>` is accepted as a
/// fallback. Blank values count as absent.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(AUTH_TOKEN_HEADER) {
        let token = value.to_str().ok()?.trim();
        return (!token.is_empty()).then_some(token);
    }

    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

/// One log line per request.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), latency_ms, "request failed");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), latency_ms, "request handled");
    }

    response
}

/// Give the router's bare 405 responses the common JSON error body.
///
/// The `Allow` header produced by the router is kept.
pub async fn json_method_not_allowed(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut rewritten = json_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    if let Some(allow) = allow {
        rewritten.headers_mut().insert(ALLOW, allow);
    }
    rewritten
}

/// Bound every request by the configured deadline.
///
/// The handler future is dropped on expiry; any store call in flight is
/// abandoned with it.
pub async fn request_timeout(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "request deadline exceeded");
            ApiError::Timeout.into_response()
        }
    }
}
