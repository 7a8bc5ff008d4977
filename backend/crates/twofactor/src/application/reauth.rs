//! Reauthentication Guard
//!
//! Destructive transitions (disable 2FA, regenerate backup codes) require the
//! account password in the same request. Every failure mode, whether an
//! unknown account, malformed input, or a wrong password, collapses into one generic
//! `ReauthenticationFailed` so the response never reveals account
//! configuration. Only a missing password is reported distinctly, as a
//! validation error rejected before any crypto runs.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::TwoFactorConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_id::AccountId;
use crate::error::{TwoFactorError, TwoFactorResult};

/// Password re-verification guard
pub struct ReauthGuard<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    config: Arc<TwoFactorConfig>,
}

impl<A> ReauthGuard<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, config: Arc<TwoFactorConfig>) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    /// Verify the account's current password.
    ///
    /// Returns the account on success so the caller does not need a second
    /// lookup. On any failure the guarded operation must not execute.
    pub async fn authorize(
        &self,
        account_id: &AccountId,
        password: &str,
    ) -> TwoFactorResult<Account> {
        if password.trim().is_empty() {
            return Err(TwoFactorError::MissingPassword);
        }

        let submitted = ClearTextPassword::new(password.to_string())
            .map_err(|_| TwoFactorError::ReauthenticationFailed)?;

        let account = self
            .account_repo
            .find_account(account_id)
            .await?
            .ok_or(TwoFactorError::ReauthenticationFailed)?;

        if !account.password_hash.verify(&submitted, self.config.pepper()) {
            tracing::warn!(
                account_id = %account_id,
                "Reauthentication failed for destructive two-factor operation"
            );
            return Err(TwoFactorError::ReauthenticationFailed);
        }

        Ok(account)
    }
}
