//! Disable Use Case
//!
//! `Enabled → Disabled`, gated by password reauthentication. The secret, the
//! enabled flag, every backup code, and any pending secret are cleared in one
//! repository transaction; there is no observable state with one cleared and
//! not the other.

use std::sync::Arc;

use crate::application::config::TwoFactorConfig;
use crate::application::reauth::ReauthGuard;
use crate::domain::repository::{AccountRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::error::{TwoFactorError, TwoFactorResult};

pub struct DisableUseCase<A, T>
where
    A: AccountRepository,
    T: TwoFactorRepository,
{
    guard: ReauthGuard<A>,
    repo: Arc<T>,
}

impl<A, T> DisableUseCase<A, T>
where
    A: AccountRepository,
    T: TwoFactorRepository,
{
    pub fn new(account_repo: Arc<A>, repo: Arc<T>, config: Arc<TwoFactorConfig>) -> Self {
        Self {
            guard: ReauthGuard::new(account_repo, config),
            repo,
        }
    }

    pub async fn execute(&self, account_id: &AccountId, password: &str) -> TwoFactorResult<()> {
        self.guard.authorize(account_id, password).await?;

        if !self.repo.disable(account_id).await? {
            return Err(TwoFactorError::NotEnabled);
        }

        tracing::info!(
            account_id = %account_id,
            "Two-factor authentication disabled"
        );

        Ok(())
    }
}
