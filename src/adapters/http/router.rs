//! Top-level router: area routers nested under `/api`, static files and
//! the tower-http middleware stack.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::admin::admin_routes;
use super::error::expose_error_details;
use super::members::member_routes;
use super::middleware::{auth_middleware, AuthState, RateLimits};
use super::public::public_routes;
use super::state::AppState;
use super::webhooks::webhook_routes;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Cross-cutting HTTP options, derived from configuration.
#[derive(Clone)]
pub struct HttpOptions {
    pub rate_limits: RateLimits,
    pub verbose_errors: bool,
    pub enable_tracing: bool,
    pub request_timeout: Duration,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    /// Served at `/` when set.
    pub static_dir: Option<PathBuf>,
    /// Local blob directory and the URL prefix it is served under.
    pub uploads: Option<(PathBuf, String)>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            rate_limits: RateLimits::disabled(),
            verbose_errors: false,
            enable_tracing: true,
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
            static_dir: None,
            uploads: None,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

pub fn build_router(state: AppState, options: HttpOptions) -> Router {
    let max_upload_bytes = usize::try_from(state.settings.max_upload_bytes).unwrap_or(usize::MAX);

    let api = Router::new()
        .merge(public_routes(&options.rate_limits))
        .nest("/members", member_routes(&options.rate_limits))
        .nest("/admin", admin_routes(&options.rate_limits, max_upload_bytes))
        .nest("/webhooks", webhook_routes())
        .layer(middleware::from_fn_with_state(
            AuthState {
                tokens: state.tokens.clone(),
                admin_users: state.repos.admin_users.clone(),
            },
            auth_middleware,
        ));

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state);

    if let Some((dir, prefix)) = &options.uploads {
        router = router.nest_service(prefix, ServeDir::new(dir));
    }
    if let Some(dir) = &options.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    if options.verbose_errors {
        router = router.layer(middleware::map_response(expose_error_details));
    }

    router = router
        .layer(CompressionLayer::new())
        .layer(cors_layer(&options.cors_origins))
        .layer(TimeoutLayer::new(options.request_timeout));

    if options.enable_tracing {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}
