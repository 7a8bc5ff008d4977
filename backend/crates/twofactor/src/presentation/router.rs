//! Two-Factor Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::TwoFactorConfig;
use crate::domain::repository::{AccountRepository, BackupCodeRepository, TwoFactorRepository};
use crate::infra::postgres::PgTwoFactorRepository;
use crate::presentation::handlers::{self, TwoFactorAppState};

/// Create the two-factor router with the PostgreSQL repository
pub fn two_factor_router(repo: PgTwoFactorRepository, config: TwoFactorConfig) -> Router {
    two_factor_router_generic(repo, config)
}

/// Create a generic two-factor router for any repository implementation
pub fn two_factor_router_generic<R>(repo: R, config: TwoFactorConfig) -> Router
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let state = TwoFactorAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/status", get(handlers::setup_status::<R>))
        .route("/setup", post(handlers::begin_setup::<R>))
        .route("/setup/verify", post(handlers::confirm_setup::<R>))
        .route("/login/verify", post(handlers::verify_login::<R>))
        .route("/disable", post(handlers::disable::<R>))
        .route(
            "/backup-codes/regenerate",
            post(handlers::regenerate_codes::<R>),
        )
        .with_state(state)
}
