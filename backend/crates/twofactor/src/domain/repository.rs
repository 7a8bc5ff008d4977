//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure
//! layer. The multi-step operations (`promote_pending`, `disable`,
//! `replace_all`) are single units of work: an implementation must make them
//! atomic so no caller ever observes a partial transition.

use crate::domain::entity::{
    account::Account, pending_secret::PendingSecret, two_factor::TwoFactor,
};
use crate::domain::value_object::account_id::AccountId;
use crate::error::TwoFactorResult;

/// Account lookup (external collaborator)
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Find an account by ID
    async fn find_account(&self, account_id: &AccountId) -> TwoFactorResult<Option<Account>>;
}

/// Two-factor lifecycle repository
#[trait_variant::make(TwoFactorRepository: Send)]
pub trait LocalTwoFactorRepository {
    /// Find the confirmed 2FA state for an account
    async fn find(&self, account_id: &AccountId) -> TwoFactorResult<Option<TwoFactor>>;

    /// Store a pending secret, replacing any prior one for the account
    async fn start_setup(&self, pending: &PendingSecret) -> TwoFactorResult<()>;

    /// Find the pending secret for an account
    async fn find_pending(&self, account_id: &AccountId)
    -> TwoFactorResult<Option<PendingSecret>>;

    /// Promote a pending secret to the active secret and mint the initial
    /// backup-code batch, atomically.
    ///
    /// `expected_secret` is the base32 form the caller verified against; if
    /// the pending record no longer matches (superseded by a concurrent
    /// "start setup"), nothing changes and `false` is returned.
    /// `consumed_step` seeds the replay defense so the confirmation code
    /// cannot be replayed at login.
    async fn promote_pending(
        &self,
        account_id: &AccountId,
        expected_secret: &str,
        consumed_step: i64,
        code_digests: &[String],
    ) -> TwoFactorResult<bool>;

    /// Clear the secret, the enabled flag, all backup codes, and any pending
    /// secret in one atomic step. Returns `false` if 2FA was not enabled.
    async fn disable(&self, account_id: &AccountId) -> TwoFactorResult<bool>;

    /// Record `step` as consumed for the account.
    ///
    /// Returns `true` only if the step is strictly newer than the last
    /// consumed one. A conditional update, so two requests presenting a code
    /// for the same step cannot both succeed.
    async fn claim_step(&self, account_id: &AccountId, step: i64) -> TwoFactorResult<bool>;
}

/// Backup-code store
#[trait_variant::make(BackupCodeRepository: Send)]
pub trait LocalBackupCodeRepository {
    /// Atomically consume the unused code with this digest.
    ///
    /// A single conditional update (find unused digest, flip `used`), not a
    /// read-then-write pair. Returns `false` for unknown and already-used
    /// digests alike.
    async fn consume(&self, account_id: &AccountId, digest: &str) -> TwoFactorResult<bool>;

    /// Replace the account's entire code set with `digests`, atomically.
    /// At no point do old and new codes validate together.
    ///
    /// The replacement is conditional on 2FA still being enabled inside the
    /// same unit of work, so a regenerate racing a disable can never mint
    /// codes for a disabled account. Returns `false` if 2FA is not enabled.
    async fn replace_all(&self, account_id: &AccountId, digests: &[String])
    -> TwoFactorResult<bool>;

    /// Count codes that are still unused
    async fn unused_count(&self, account_id: &AccountId) -> TwoFactorResult<i64>;
}
