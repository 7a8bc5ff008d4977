//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twofactor::{PgTwoFactorRepository, TwoFactorConfig, two_factor_router};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// Pending setup secrets older than this are swept at startup
const PENDING_SECRET_MAX_AGE_HOURS: i64 = 24;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,twofactor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove pending secrets from abandoned setup wizards
    // Errors here should not prevent server startup
    let store_for_cleanup = PgTwoFactorRepository::new(pool.clone());
    let cutoff = Utc::now() - Duration::hours(PENDING_SECRET_MAX_AGE_HOURS);
    match store_for_cleanup.cleanup_stale_pending(cutoff).await {
        Ok(deleted) => {
            tracing::info!(
                pending_deleted = deleted,
                "Stale pending-setup cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Stale pending-setup cleanup failed, continuing anyway"
            );
        }
    }

    // Two-factor configuration: the pepper must match the one the accounts
    // service hashes passwords with
    let password_pepper = match env::var("PASSWORD_PEPPER") {
        Ok(b64) => Some(Engine::decode(&general_purpose::STANDARD, &b64)?),
        Err(_) => {
            if cfg!(debug_assertions) {
                None
            } else {
                anyhow::bail!("PASSWORD_PEPPER must be set in production");
            }
        }
    };
    let config = TwoFactorConfig {
        password_pepper,
        ..TwoFactorConfig::default()
    };

    let store = PgTwoFactorRepository::new(pool.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/2fa", two_factor_router(store, config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
