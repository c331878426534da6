//! Clubhouse API server.

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clubhouse::adapters::auth::{Argon2PasswordHasher, JwtTokenService};
use clubhouse::adapters::content::load_site_content;
use clubhouse::adapters::http::middleware::RateLimits;
use clubhouse::adapters::http::{build_router, AppState, HttpOptions, Repositories};
use clubhouse::adapters::memory::InMemoryStore;
use clubhouse::adapters::postgres::{
    self, PostgresAdminUserRepository, PostgresContactMessageRepository, PostgresEventRepository,
    PostgresGalleryRepository, PostgresMarketingReader, PostgresMemberRepository,
    PostgresPaymentRepository, PostgresReferralSourceRepository,
};
use clubhouse::adapters::rate_limiter::InMemoryRateLimiter;
use clubhouse::adapters::receipt::select_renderer;
use clubhouse::adapters::storage::{LocalBlobStorage, VercelBlobStorage};
use clubhouse::adapters::stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
use clubhouse::application::handlers::admin_users::{BootstrapAdminCommand, BootstrapAdminHandler};
use clubhouse::application::ClubSettings;
use clubhouse::config::{AppConfig, PaymentMode, PersistenceBackend, StorageBackend};
use clubhouse::ports::{BlobStorage, PasswordHasher, PaymentProvider};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

async fn repositories(config: &AppConfig) -> Result<Repositories, BoxError> {
    match config.database.backend {
        PersistenceBackend::Memory => {
            tracing::warn!("Using in-memory persistence; data is lost on restart");
            Ok(Repositories::in_memory(InMemoryStore::new()))
        }
        PersistenceBackend::Postgres => {
            let pool = postgres::connect(&config.database).await?;
            if config.database.run_migrations {
                postgres::run_migrations(&pool).await?;
            }
            Ok(Repositories {
                members: Arc::new(PostgresMemberRepository::new(pool.clone())),
                admin_users: Arc::new(PostgresAdminUserRepository::new(pool.clone())),
                events: Arc::new(PostgresEventRepository::new(pool.clone())),
                gallery: Arc::new(PostgresGalleryRepository::new(pool.clone())),
                payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
                referral_sources: Arc::new(PostgresReferralSourceRepository::new(pool.clone())),
                contact_messages: Arc::new(PostgresContactMessageRepository::new(pool.clone())),
                marketing: Arc::new(PostgresMarketingReader::new(pool)),
            })
        }
    }
}

fn payment_provider(config: &AppConfig) -> Arc<dyn PaymentProvider> {
    match config.payment.mode {
        PaymentMode::Stripe => {
            if config.payment.is_test_mode() {
                tracing::info!("Stripe is using test-mode keys");
            } else if config.is_production() && !config.payment.is_live_mode() {
                tracing::warn!("Stripe key is not a live-mode key");
            }
            Arc::new(StripePaymentAdapter::new(StripeConfig::from_payment_config(
                &config.payment,
            )))
        }
        PaymentMode::Mock => {
            tracing::warn!("Using mock payment provider; no charges will be made");
            if config.payment.stripe_webhook_secret.is_empty() {
                Arc::new(MockPaymentProvider::new())
            } else {
                Arc::new(MockPaymentProvider::with_webhook_secret(
                    &config.payment.stripe_webhook_secret,
                ))
            }
        }
    }
}

/// Blob storage plus, for local storage, the directory to serve.
fn blob_storage(config: &AppConfig) -> (Arc<dyn BlobStorage>, Option<(std::path::PathBuf, String)>) {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Local => (
            Arc::new(LocalBlobStorage::new(
                storage.local_dir.clone(),
                storage.public_base_url.clone(),
            )),
            Some((storage.local_dir.clone(), storage.public_base_url.clone())),
        ),
        StorageBackend::Vercel => (
            Arc::new(VercelBlobStorage::new(
                storage.vercel_token.clone().unwrap_or_default(),
                storage.vercel_api_url.clone(),
            )),
            None,
        ),
    }
}

async fn bootstrap_admin(
    config: &AppConfig,
    repos: &Repositories,
    hasher: Arc<dyn PasswordHasher>,
) -> Result<(), BoxError> {
    let Some((email, password)) = config.auth.bootstrap_admin() else {
        return Ok(());
    };
    let handler = BootstrapAdminHandler::new(repos.admin_users.clone(), hasher);
    let created = handler
        .handle(BootstrapAdminCommand {
            email: email.to_string(),
            password: password.to_string(),
            name: config.auth.bootstrap_admin_name.clone(),
        })
        .await?;
    if let Some(admin) = created {
        tracing::info!(admin_id = %admin.id, "Bootstrap administrator created");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting Clubhouse API server"
    );

    let site_content = load_site_content(&config.content.site_path).await?;
    let settings = ClubSettings::from_config(&config, site_content.club_name.clone());

    let repos = repositories(&config).await?;
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    bootstrap_admin(&config, &repos, password_hasher.clone()).await?;

    let (blob_storage, uploads) = blob_storage(&config);
    let rate_limiter = Arc::new(InMemoryRateLimiter::from_features(&config.features));

    let state = AppState {
        repos,
        payment_provider: payment_provider(&config),
        blob_storage,
        receipt_renderer: select_renderer(&config.receipt).await,
        password_hasher,
        tokens: Arc::new(JwtTokenService::new(
            SecretString::new(config.auth.jwt_secret.clone()),
            config.auth.issuer.clone(),
            config.auth.token_ttl(),
        )),
        rate_limiter: rate_limiter.clone(),
        site_content: Arc::new(site_content),
        settings,
    };

    let options = HttpOptions {
        rate_limits: if config.features.enable_rate_limiting {
            RateLimits::new(rate_limiter, config.server.trust_proxy_headers)
        } else {
            RateLimits::disabled()
        },
        verbose_errors: config.features.verbose_errors,
        enable_tracing: config.features.enable_tracing,
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
        static_dir: config.content.static_dir.clone(),
        uploads,
    };

    let app = build_router(state, options);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
