//! Per-resource rate limiting middleware.
//!
//! Sensitive public endpoints (login, signup, contact form) are limited per
//! client IP. Rate limit status is returned in standard headers:
//! - `X-RateLimit-Limit`, `X-RateLimit-Remaining`, `X-RateLimit-Reset`
//! - `Retry-After` (only on 429)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{RateLimitKey, RateLimitResult, RateLimiter};

pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// State for one limited route group.
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<dyn RateLimiter>,
    pub resource: &'static str,
    /// Honor `X-Forwarded-For` / `X-Real-IP`. Only safe behind a proxy.
    pub trust_proxy_headers: bool,
}

/// Per-route limits; a no-op when rate limiting is disabled.
#[derive(Clone, Default)]
pub struct RateLimits {
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy_headers: bool,
}

impl RateLimits {
    pub fn new(limiter: Arc<dyn RateLimiter>, trust_proxy_headers: bool) -> Self {
        Self {
            limiter: Some(limiter),
            trust_proxy_headers,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn wrap<S>(&self, route: MethodRouter<S>, resource: &'static str) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match &self.limiter {
            Some(limiter) => route.layer(middleware::from_fn_with_state(
                RateLimitState {
                    limiter: limiter.clone(),
                    resource,
                    trust_proxy_headers: self.trust_proxy_headers,
                },
                rate_limit_middleware,
            )),
            None => route,
        }
    }
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request, connect_info.as_ref(), state.trust_proxy_headers);
    let key = RateLimitKey::ip(&ip, state.resource);

    let status = match state.limiter.check(key).await {
        Ok(RateLimitResult::Allowed(status)) => Some(status),
        Ok(RateLimitResult::Denied(denied)) => {
            tracing::warn!(ip = %ip, resource = state.resource, "Rate limit exceeded");
            let err = DomainError::new(ErrorCode::RateLimited, denied.message)
                .with_detail("retry_after_secs", denied.retry_after_secs.to_string());
            let mut response = ApiError(err).into_response();
            let headers = response.headers_mut();
            headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(denied.retry_after_secs));
            headers.insert(X_RATELIMIT_LIMIT.clone(), HeaderValue::from(denied.limit));
            headers.insert(X_RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
            return response;
        }
        Err(e) => {
            // Fail open.
            tracing::warn!(error = %e, "Rate limiter unavailable");
            None
        }
    };

    let mut response = next.run(request).await;
    if let Some(status) = status {
        let headers = response.headers_mut();
        headers.insert(X_RATELIMIT_LIMIT.clone(), HeaderValue::from(status.limit));
        headers.insert(X_RATELIMIT_REMAINING.clone(), HeaderValue::from(status.remaining));
        headers.insert(
            X_RATELIMIT_RESET.clone(),
            HeaderValue::from(status.reset_at.as_unix_secs()),
        );
    }
    response
}

/// Client IP, preferring forwarded headers when trusted.
fn client_ip<B>(
    request: &axum::http::Request<B>,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        let headers = request.headers();
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded.or(real_ip) {
            return ip.to_string();
        }
    }

    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn forwarded_headers_only_when_trusted() {
        let request = Request::builder()
            .uri("/")
            .header("X-Forwarded-For", "1.2.3.4, 5.6.7.8")
            .body(())
            .unwrap();
        let peer = ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000)));

        assert_eq!(client_ip(&request, Some(&peer), true), "1.2.3.4");
        assert_eq!(client_ip(&request, Some(&peer), false), "10.0.0.1");
    }

    #[test]
    fn real_ip_is_fallback_and_unknown_without_peer() {
        let request = Request::builder()
            .uri("/")
            .header("X-Real-IP", "9.8.7.6")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&request, None, true), "9.8.7.6");

        let bare = Request::builder().uri("/").body(()).unwrap();
        assert_eq!(client_ip(&bare, None, true), "unknown");
    }
}
