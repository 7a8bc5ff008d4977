//! Verify Login Code Use Case
//!
//! Consulted by the external sign-in flow after the password factor passes.
//! Accepts either a 6-digit TOTP code (with one-step-back skew and per-step
//! replay defense) or a backup code (consumed exactly once). All rejection
//! reasons (wrong code, replayed step, consumed backup code, no secret)
//! surface as the same generic `InvalidTwoFactorCode`.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::repository::{AccountRepository, BackupCodeRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::domain::value_object::backup_code;
use crate::domain::value_object::totp_secret::is_valid_code_format;
use crate::error::{TwoFactorError, TwoFactorResult};

/// How the submitted credential was validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedWith {
    TotpCode,
    BackupCode,
}

pub struct VerifyLoginUseCase<A, T, B>
where
    A: AccountRepository,
    T: TwoFactorRepository,
    B: BackupCodeRepository,
{
    account_repo: Arc<A>,
    repo: Arc<T>,
    code_repo: Arc<B>,
}

impl<A, T, B> VerifyLoginUseCase<A, T, B>
where
    A: AccountRepository,
    T: TwoFactorRepository,
    B: BackupCodeRepository,
{
    pub fn new(account_repo: Arc<A>, repo: Arc<T>, code_repo: Arc<B>) -> Self {
        Self {
            account_repo,
            repo,
            code_repo,
        }
    }

    pub async fn execute(
        &self,
        account_id: &AccountId,
        submitted: &str,
    ) -> TwoFactorResult<VerifiedWith> {
        self.execute_at(account_id, submitted, Utc::now().timestamp() as u64)
            .await
    }

    /// Same as [`Self::execute`] with an explicit clock, for tests
    pub async fn execute_at(
        &self,
        account_id: &AccountId,
        submitted: &str,
        now: u64,
    ) -> TwoFactorResult<VerifiedWith> {
        if is_valid_code_format(submitted) {
            return self.verify_totp(account_id, submitted, now).await;
        }

        // Not a 6-digit code: treat as a backup code
        let normalized =
            backup_code::normalize(submitted).ok_or(TwoFactorError::InvalidCodeFormat)?;

        let consumed = self
            .code_repo
            .consume(account_id, &backup_code::digest(&normalized))
            .await?;

        if !consumed {
            return Err(TwoFactorError::InvalidTwoFactorCode);
        }

        tracing::info!(
            account_id = %account_id,
            "Backup code consumed for sign-in"
        );

        Ok(VerifiedWith::BackupCode)
    }

    async fn verify_totp(
        &self,
        account_id: &AccountId,
        code: &str,
        now: u64,
    ) -> TwoFactorResult<VerifiedWith> {
        let account = self
            .account_repo
            .find_account(account_id)
            .await?
            .ok_or(TwoFactorError::InvalidTwoFactorCode)?;

        let state = self
            .repo
            .find(account_id)
            .await?
            .ok_or(TwoFactorError::InvalidTwoFactorCode)?;

        // An unconfirmed or cleared secret never verifies a login
        let secret = state
            .active_secret()
            .ok_or(TwoFactorError::InvalidTwoFactorCode)?;

        let matched_step = secret
            .matched_step_at(code, &account.label, now)
            .map_err(|e| TwoFactorError::Internal(e.to_string()))?
            .ok_or(TwoFactorError::InvalidTwoFactorCode)?;

        // Claim the step the code belongs to; an identical code cannot be
        // accepted a second time, even in the following window via skew
        if !self.repo.claim_step(account_id, matched_step).await? {
            tracing::warn!(
                account_id = %account_id,
                "Replayed two-factor code rejected"
            );
            return Err(TwoFactorError::InvalidTwoFactorCode);
        }

        Ok(VerifiedWith::TotpCode)
    }
}
