//! HTTP Handlers
//!
//! The handlers are a thin projection over the use cases: plaintext backup
//! codes flow straight from use-case output into the response body and are
//! never cached or re-readable through this layer.

use axum::Json;
use axum::extract::{Extension, State};
use std::sync::Arc;

use crate::application::config::TwoFactorConfig;
use crate::application::{
    BeginSetupUseCase, ConfirmSetupUseCase, DisableUseCase, RegenerateCodesUseCase,
    SetupStatusUseCase, VerifiedWith, VerifyLoginUseCase,
};
use crate::domain::repository::{AccountRepository, BackupCodeRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::error::TwoFactorResult;
use crate::presentation::dto::{
    BackupCodesResponse, BeginSetupResponse, ConfirmSetupRequest, DisableRequest,
    DisableResponse, RegenerateCodesRequest, SetupStatusResponse, VerifyLoginRequest,
    VerifyLoginResponse,
};

/// Authenticated identity, inserted into request extensions by the host
/// application's session middleware (session handling is not this crate's
/// concern)
#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub AccountId);

/// Shared state for two-factor handlers
#[derive(Clone)]
pub struct TwoFactorAppState<R>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<TwoFactorConfig>,
}

// ============================================================================
// Setup Status
// ============================================================================

/// GET /api/2fa/status
pub async fn setup_status<R>(
    State(state): State<TwoFactorAppState<R>>,
    Extension(current): Extension<CurrentAccount>,
) -> TwoFactorResult<Json<SetupStatusResponse>>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case = SetupStatusUseCase::new(state.repo.clone(), state.repo.clone());
    let output = use_case.execute(&current.0).await?;

    Ok(Json(SetupStatusResponse {
        enabled: output.enabled,
        pending_setup: output.pending_setup,
        backup_codes_remaining: output.backup_codes_remaining,
    }))
}

// ============================================================================
// Setup Wizard
// ============================================================================

/// POST /api/2fa/setup
pub async fn begin_setup<R>(
    State(state): State<TwoFactorAppState<R>>,
    Extension(current): Extension<CurrentAccount>,
) -> TwoFactorResult<Json<BeginSetupResponse>>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case = BeginSetupUseCase::new(state.repo.clone(), state.repo.clone());
    let output = use_case.execute(&current.0).await?;

    Ok(Json(BeginSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret_base32,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /api/2fa/setup/verify
pub async fn confirm_setup<R>(
    State(state): State<TwoFactorAppState<R>>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<ConfirmSetupRequest>,
) -> TwoFactorResult<Json<BackupCodesResponse>>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case =
        ConfirmSetupUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let output = use_case.execute(&current.0, &req.code).await?;

    Ok(Json(BackupCodesResponse {
        backup_codes: output.backup_codes,
    }))
}

// ============================================================================
// Login Verification
// ============================================================================

/// POST /api/2fa/login/verify
pub async fn verify_login<R>(
    State(state): State<TwoFactorAppState<R>>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<VerifyLoginRequest>,
) -> TwoFactorResult<Json<VerifyLoginResponse>>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case =
        VerifyLoginUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let method = use_case.execute(&current.0, &req.code).await?;

    Ok(Json(VerifyLoginResponse {
        verified: true,
        method: match method {
            VerifiedWith::TotpCode => "totp".to_string(),
            VerifiedWith::BackupCode => "backupCode".to_string(),
        },
    }))
}

// ============================================================================
// Destructive Operations (reauthenticated)
// ============================================================================

/// POST /api/2fa/disable
pub async fn disable<R>(
    State(state): State<TwoFactorAppState<R>>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<DisableRequest>,
) -> TwoFactorResult<Json<DisableResponse>>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case =
        DisableUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    use_case.execute(&current.0, &req.password).await?;

    Ok(Json(DisableResponse { disabled: true }))
}

/// POST /api/2fa/backup-codes/regenerate
pub async fn regenerate_codes<R>(
    State(state): State<TwoFactorAppState<R>>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<RegenerateCodesRequest>,
) -> TwoFactorResult<Json<BackupCodesResponse>>
where
    R: AccountRepository
        + TwoFactorRepository
        + BackupCodeRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case = RegenerateCodesUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    let output = use_case.execute(&current.0, &req.password).await?;

    Ok(Json(BackupCodesResponse {
        backup_codes: output.backup_codes,
    }))
}
