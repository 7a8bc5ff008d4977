//! Setup Status Use Case
//!
//! Pure projection of the state machine for the settings UI: whether 2FA is
//! enabled, whether a setup is awaiting confirmation, and how many backup
//! codes remain unused. Never exposes secrets or code material.

use std::sync::Arc;

use crate::domain::repository::{BackupCodeRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::error::TwoFactorResult;

pub struct SetupStatusOutput {
    pub enabled: bool,
    pub pending_setup: bool,
    pub backup_codes_remaining: i64,
}

pub struct SetupStatusUseCase<T, B>
where
    T: TwoFactorRepository,
    B: BackupCodeRepository,
{
    repo: Arc<T>,
    code_repo: Arc<B>,
}

impl<T, B> SetupStatusUseCase<T, B>
where
    T: TwoFactorRepository,
    B: BackupCodeRepository,
{
    pub fn new(repo: Arc<T>, code_repo: Arc<B>) -> Self {
        Self { repo, code_repo }
    }

    pub async fn execute(&self, account_id: &AccountId) -> TwoFactorResult<SetupStatusOutput> {
        let enabled = self
            .repo
            .find(account_id)
            .await?
            .map(|state| state.enabled)
            .unwrap_or(false);

        let pending_setup = self.repo.find_pending(account_id).await?.is_some();

        let backup_codes_remaining = if enabled {
            self.code_repo.unused_count(account_id).await?
        } else {
            0
        };

        Ok(SetupStatusOutput {
            enabled,
            pending_setup,
            backup_codes_remaining,
        })
    }
}
