//! Begin Setup Use Case
//!
//! `Disabled → PendingSetup`. Issues a fresh secret and returns the
//! provisioning material (QR image, otpauth URL, manual-entry key). Any
//! prior pending secret is overwritten; at most one is in flight per
//! account. The active secret, if 2FA is already enabled, stays untouched
//! until the new one is confirmed.

use std::sync::Arc;

use crate::domain::entity::pending_secret::PendingSecret;
use crate::domain::repository::{AccountRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::error::{TwoFactorError, TwoFactorResult};

/// Setup output: everything an authenticator app needs
pub struct BeginSetupOutput {
    /// QR code as base64-encoded PNG
    pub qr_code_base64: String,
    /// Secret for manual entry
    pub secret_base32: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

pub struct BeginSetupUseCase<A, T>
where
    A: AccountRepository,
    T: TwoFactorRepository,
{
    account_repo: Arc<A>,
    repo: Arc<T>,
}

impl<A, T> BeginSetupUseCase<A, T>
where
    A: AccountRepository,
    T: TwoFactorRepository,
{
    pub fn new(account_repo: Arc<A>, repo: Arc<T>) -> Self {
        Self { account_repo, repo }
    }

    pub async fn execute(&self, account_id: &AccountId) -> TwoFactorResult<BeginSetupOutput> {
        let account = self
            .account_repo
            .find_account(account_id)
            .await?
            .ok_or(TwoFactorError::AccountNotFound)?;

        let pending = PendingSecret::issue(*account_id);

        // Persist before rendering: the rendered QR must always correspond to
        // the secret the confirmation step will verify against
        self.repo.start_setup(&pending).await?;

        let qr_code_base64 = pending
            .secret
            .qr_png_base64(&account.label)
            .map_err(|e| TwoFactorError::Internal(e.to_string()))?;
        let otpauth_url = pending
            .secret
            .otpauth_url(&account.label)
            .map_err(|e| TwoFactorError::Internal(e.to_string()))?;

        tracing::info!(
            account_id = %account_id,
            "Two-factor setup started"
        );

        Ok(BeginSetupOutput {
            qr_code_base64,
            secret_base32: pending.secret.as_base32().to_string(),
            otpauth_url,
        })
    }
}
