//! Confirm Setup Use Case
//!
//! `PendingSetup → Enabled`. Verifies a submitted code against the pending
//! secret; on success promotes it to the active secret and mints the initial
//! backup-code batch in one repository transaction. On failure the pending
//! secret stays retryable. A pending secret superseded by a concurrent
//! "start setup" aborts cleanly as `NoPendingSetup`.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::TwoFactorConfig;
use crate::domain::repository::{AccountRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::domain::value_object::backup_code::BackupCodeBatch;
use crate::domain::value_object::totp_secret::{is_valid_code_format, step_at};
use crate::error::{TwoFactorError, TwoFactorResult};

/// Output: the one and only plaintext reveal of the initial backup codes
pub struct ConfirmSetupOutput {
    pub backup_codes: Vec<String>,
}

pub struct ConfirmSetupUseCase<A, T>
where
    A: AccountRepository,
    T: TwoFactorRepository,
{
    account_repo: Arc<A>,
    repo: Arc<T>,
    config: Arc<TwoFactorConfig>,
}

impl<A, T> ConfirmSetupUseCase<A, T>
where
    A: AccountRepository,
    T: TwoFactorRepository,
{
    pub fn new(account_repo: Arc<A>, repo: Arc<T>, config: Arc<TwoFactorConfig>) -> Self {
        Self {
            account_repo,
            repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        account_id: &AccountId,
        code: &str,
    ) -> TwoFactorResult<ConfirmSetupOutput> {
        self.execute_at(account_id, code, Utc::now().timestamp() as u64)
            .await
    }

    /// Same as [`Self::execute`] with an explicit clock, for tests
    pub async fn execute_at(
        &self,
        account_id: &AccountId,
        code: &str,
        now: u64,
    ) -> TwoFactorResult<ConfirmSetupOutput> {
        if !is_valid_code_format(code) {
            return Err(TwoFactorError::InvalidCodeFormat);
        }

        let account = self
            .account_repo
            .find_account(account_id)
            .await?
            .ok_or(TwoFactorError::AccountNotFound)?;

        let pending = self
            .repo
            .find_pending(account_id)
            .await?
            .ok_or(TwoFactorError::NoPendingSetup)?;

        let valid = pending
            .secret
            .verify_at(code, &account.label, now)
            .map_err(|e| TwoFactorError::Internal(e.to_string()))?;

        if !valid {
            // Stay in PendingSetup; the client may retry with a fresh code
            // without re-scanning the QR
            return Err(TwoFactorError::InvalidTwoFactorCode);
        }

        let batch = BackupCodeBatch::generate(self.config.backup_code_count);

        // One transaction: promote the secret, record the consumed step,
        // discard the pending record, insert the code digests. If any part
        // fails the account never ends up enabled without backup codes.
        let promoted = self
            .repo
            .promote_pending(
                account_id,
                pending.secret.as_base32(),
                step_at(now),
                &batch.digests,
            )
            .await?;

        if !promoted {
            // A concurrent "start setup" replaced the secret we verified
            return Err(TwoFactorError::NoPendingSetup);
        }

        tracing::info!(
            account_id = %account_id,
            backup_codes = batch.codes.len(),
            "Two-factor authentication enabled"
        );

        Ok(ConfirmSetupOutput {
            backup_codes: batch.codes,
        })
    }
}
