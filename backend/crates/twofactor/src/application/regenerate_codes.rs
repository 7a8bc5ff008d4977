//! Regenerate Backup Codes Use Case
//!
//! Self-loop on `Enabled`, gated by password reauthentication. Replaces the
//! whole code set atomically: after this runs, every pre-existing code is
//! invalid and each new code validates exactly once.

use std::sync::Arc;

use crate::application::config::TwoFactorConfig;
use crate::application::reauth::ReauthGuard;
use crate::domain::repository::{AccountRepository, BackupCodeRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::domain::value_object::backup_code::BackupCodeBatch;
use crate::error::{TwoFactorError, TwoFactorResult};

/// Output: the one and only plaintext reveal of the new batch
pub struct RegenerateCodesOutput {
    pub backup_codes: Vec<String>,
}

pub struct RegenerateCodesUseCase<A, B>
where
    A: AccountRepository,
    B: BackupCodeRepository,
{
    guard: ReauthGuard<A>,
    code_repo: Arc<B>,
    config: Arc<TwoFactorConfig>,
}

impl<A, B> RegenerateCodesUseCase<A, B>
where
    A: AccountRepository,
    B: BackupCodeRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        code_repo: Arc<B>,
        config: Arc<TwoFactorConfig>,
    ) -> Self {
        Self {
            guard: ReauthGuard::new(account_repo, config.clone()),
            code_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        account_id: &AccountId,
        password: &str,
    ) -> TwoFactorResult<RegenerateCodesOutput> {
        self.guard.authorize(account_id, password).await?;

        let batch = BackupCodeBatch::generate(self.config.backup_code_count);

        // The enabled check lives inside the replacement's unit of work, so
        // a disable racing this request cannot leave codes behind
        let replaced = self
            .code_repo
            .replace_all(account_id, &batch.digests)
            .await?;

        if !replaced {
            return Err(TwoFactorError::NotEnabled);
        }

        tracing::info!(
            account_id = %account_id,
            backup_codes = batch.codes.len(),
            "Backup codes regenerated"
        );

        Ok(RegenerateCodesOutput {
            backup_codes: batch.codes,
        })
    }
}
