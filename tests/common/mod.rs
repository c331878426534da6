//! Test harness: the full router over in-memory adapters.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use clubhouse::adapters::auth::{Argon2PasswordHasher, JwtTokenService};
use clubhouse::adapters::http::middleware::RateLimits;
use clubhouse::adapters::http::{build_router, AppState, HttpOptions, Repositories};
use clubhouse::adapters::memory::InMemoryStore;
use clubhouse::adapters::rate_limiter::{
    InMemoryRateLimiter, CONTACT_RESOURCE, LOGIN_RESOURCE, SIGNUP_RESOURCE,
};
use clubhouse::adapters::receipt::BuiltinPdfRenderer;
use clubhouse::adapters::storage::InMemoryBlobStorage;
use clubhouse::adapters::stripe::MockPaymentProvider;
use clubhouse::application::handlers::admin_users::{BootstrapAdminCommand, BootstrapAdminHandler};
use clubhouse::application::ClubSettings;
use clubhouse::config::RateLimitRule;
use clubhouse::domain::content::{ContactDetails, HomeContent, SiteContent};
use clubhouse::ports::PasswordHasher;

pub const ADMIN_EMAIL: &str = "admin@club.example.org";
pub const ADMIN_PASSWORD: &str = "admin-password-123";
pub const MEMBER_PASSWORD: &str = "member-password-123";

/// Contact submissions allowed per window in tests.
pub const CONTACT_LIMIT: u32 = 2;

pub struct TestApp {
    pub router: Router,
    pub payments: Arc<MockPaymentProvider>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

fn settings() -> ClubSettings {
    ClubSettings {
        club_name: "Test Club".to_string(),
        currency: "usd".to_string(),
        membership_fee_cents: 5_000,
        membership_period_days: 365,
        renewal_window_days: 30,
        site_url: "https://club.example.org".to_string(),
        max_upload_bytes: 1024 * 1024,
    }
}

fn site_content() -> SiteContent {
    SiteContent {
        club_name: "Test Club".to_string(),
        home: HomeContent {
            headline: "Welcome".to_string(),
            intro: "A club for testing.".to_string(),
        },
        about: "Run by tests.".to_string(),
        faq: Vec::new(),
        contact: ContactDetails {
            email: Some("hello@club.example.org".to_string()),
            phone: None,
            address: None,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = InMemoryStore::new();
        let repos = Repositories::in_memory(store);
        let hasher: Arc<dyn PasswordHasher> =
            Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1).unwrap());

        BootstrapAdminHandler::new(repos.admin_users.clone(), hasher.clone())
            .handle(BootstrapAdminCommand {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                name: "Club Admin".to_string(),
            })
            .await
            .unwrap();

        let limiter = Arc::new(InMemoryRateLimiter::new(HashMap::from([
            (LOGIN_RESOURCE.to_string(), RateLimitRule::new(100, 60)),
            (SIGNUP_RESOURCE.to_string(), RateLimitRule::new(100, 60)),
            (CONTACT_RESOURCE.to_string(), RateLimitRule::new(CONTACT_LIMIT, 60)),
        ])));

        let payments = Arc::new(MockPaymentProvider::new());

        let state = AppState {
            repos,
            payment_provider: payments.clone(),
            blob_storage: Arc::new(InMemoryBlobStorage::new()),
            receipt_renderer: Arc::new(BuiltinPdfRenderer::new()),
            password_hasher: hasher,
            tokens: Arc::new(JwtTokenService::new(
                SecretString::new("test-secret-that-is-long-enough-for-hs256".to_string()),
                "clubhouse-tests",
                Duration::from_secs(3600),
            )),
            rate_limiter: limiter.clone(),
            site_content: Arc::new(site_content()),
            settings: settings(),
        };

        let options = HttpOptions {
            rate_limits: RateLimits::new(limiter, false),
            enable_tracing: false,
            ..HttpOptions::default()
        };

        Self {
            router: build_router(state, options),
            payments,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Signs up a member and returns `(member_id, token, payment_id)`.
    pub async fn sign_up(&self, email: &str) -> (String, String, String) {
        let response = self
            .post(
                "/api/members/signup",
                None,
                json!({
                    "email": email,
                    "password": MEMBER_PASSWORD,
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
        let body = response.json();
        (
            body["member"]["id"].as_str().unwrap().to_string(),
            body["token"]["token"].as_str().unwrap().to_string(),
            body["checkout"]["payment_id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn admin_token(&self) -> String {
        self.log_in_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn log_in_admin(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/admin/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.json());
        response.json()["token"]["token"].as_str().unwrap().to_string()
    }

    /// Posts a signed `checkout.session.completed` webhook for `payment_id`.
    pub async fn complete_checkout(&self, payment_id: &str) -> TestResponse {
        let payload = json!({
            "id": format!("evt_{}", payment_id),
            "type": "checkout.session.completed",
            "created": chrono::Utc::now().timestamp(),
            "livemode": false,
            "data": { "object": {
                "id": format!("cs_test_{}", payment_id),
                "object": "checkout.session",
                "payment_intent": format!("pi_{}", payment_id),
                "payment_status": "paid",
                "amount_total": 5000,
                "metadata": { "payment_id": payment_id }
            }}
        })
        .to_string();
        let signature = self.payments.sign_webhook(payload.as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/webhooks/stripe")
            .header("stripe-signature", signature)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap();
        self.send(request).await
    }
}
