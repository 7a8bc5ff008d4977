//! In-Memory Repository Implementation
//!
//! Backing store for tests and local development. A single mutex around the
//! whole state gives every trait method the same atomicity the Postgres
//! implementation gets from conditional updates and transactions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account, backup_code::BackupCode, pending_secret::PendingSecret,
    two_factor::TwoFactor,
};
use crate::domain::repository::{AccountRepository, BackupCodeRepository, TwoFactorRepository};
use crate::domain::value_object::account_id::AccountId;
use crate::error::TwoFactorResult;

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    two_factor: HashMap<Uuid, TwoFactor>,
    pending: HashMap<Uuid, PendingSecret>,
    backup_codes: HashMap<Uuid, Vec<BackupCode>>,
}

/// In-memory two-factor repository
#[derive(Clone, Default)]
pub struct InMemoryTwoFactorRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryTwoFactorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account (test fixture; accounts are owned elsewhere in prod)
    pub fn insert_account(&self, account: Account) {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state
            .accounts
            .insert(*account.account_id.as_uuid(), account);
    }
}

impl AccountRepository for InMemoryTwoFactorRepository {
    async fn find_account(&self, account_id: &AccountId) -> TwoFactorResult<Option<Account>> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.accounts.get(account_id.as_uuid()).cloned())
    }
}

impl TwoFactorRepository for InMemoryTwoFactorRepository {
    async fn find(&self, account_id: &AccountId) -> TwoFactorResult<Option<TwoFactor>> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.two_factor.get(account_id.as_uuid()).cloned())
    }

    async fn start_setup(&self, pending: &PendingSecret) -> TwoFactorResult<()> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state
            .pending
            .insert(*pending.account_id.as_uuid(), pending.clone());
        Ok(())
    }

    async fn find_pending(
        &self,
        account_id: &AccountId,
    ) -> TwoFactorResult<Option<PendingSecret>> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.pending.get(account_id.as_uuid()).cloned())
    }

    async fn promote_pending(
        &self,
        account_id: &AccountId,
        expected_secret: &str,
        consumed_step: i64,
        code_digests: &[String],
    ) -> TwoFactorResult<bool> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let key = *account_id.as_uuid();

        // Superseded by a concurrent "start setup"?
        let matches = state
            .pending
            .get(&key)
            .map(|p| p.secret.as_base32() == expected_secret)
            .unwrap_or(false);
        if !matches {
            return Ok(false);
        }

        let pending = state.pending.remove(&key).expect("checked above");
        let now = Utc::now();

        let entry = state
            .two_factor
            .entry(key)
            .or_insert_with(|| TwoFactor::disabled(*account_id));
        entry.secret = Some(pending.secret);
        entry.enabled = true;
        entry.last_used_step = Some(consumed_step);
        entry.updated_at = now;

        let codes = code_digests
            .iter()
            .map(|digest| BackupCode::mint(*account_id, digest.clone()))
            .collect();
        state.backup_codes.insert(key, codes);

        Ok(true)
    }

    async fn disable(&self, account_id: &AccountId) -> TwoFactorResult<bool> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let key = *account_id.as_uuid();

        let Some(entry) = state.two_factor.get_mut(&key) else {
            return Ok(false);
        };
        if !entry.enabled {
            return Ok(false);
        }

        entry.enabled = false;
        entry.secret = None;
        entry.last_used_step = None;
        entry.updated_at = Utc::now();

        state.backup_codes.remove(&key);
        state.pending.remove(&key);

        Ok(true)
    }

    async fn claim_step(&self, account_id: &AccountId, step: i64) -> TwoFactorResult<bool> {
        let mut state = self.state.lock().expect("repository mutex poisoned");

        let Some(entry) = state.two_factor.get_mut(account_id.as_uuid()) else {
            return Ok(false);
        };
        if !entry.enabled {
            return Ok(false);
        }
        if entry.last_used_step.is_some_and(|last| last >= step) {
            return Ok(false);
        }

        entry.last_used_step = Some(step);
        entry.updated_at = Utc::now();
        Ok(true)
    }
}

impl BackupCodeRepository for InMemoryTwoFactorRepository {
    async fn consume(&self, account_id: &AccountId, digest: &str) -> TwoFactorResult<bool> {
        let mut state = self.state.lock().expect("repository mutex poisoned");

        let Some(codes) = state.backup_codes.get_mut(account_id.as_uuid()) else {
            return Ok(false);
        };

        // Find-and-flip under the same lock: concurrent callers serialize here
        match codes.iter_mut().find(|c| c.digest == digest && !c.used) {
            Some(code) => {
                code.mark_used();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_all(
        &self,
        account_id: &AccountId,
        digests: &[String],
    ) -> TwoFactorResult<bool> {
        let mut state = self.state.lock().expect("repository mutex poisoned");

        // Same atomicity as the conditional SQL: a disable that already ran
        // must not be followed by freshly minted codes
        let enabled = state
            .two_factor
            .get(account_id.as_uuid())
            .map(|entry| entry.enabled)
            .unwrap_or(false);
        if !enabled {
            return Ok(false);
        }

        let codes = digests
            .iter()
            .map(|digest| BackupCode::mint(*account_id, digest.clone()))
            .collect();
        state.backup_codes.insert(*account_id.as_uuid(), codes);

        Ok(true)
    }

    async fn unused_count(&self, account_id: &AccountId) -> TwoFactorResult<i64> {
        let state = self.state.lock().expect("repository mutex poisoned");

        Ok(state
            .backup_codes
            .get(account_id.as_uuid())
            .map(|codes| codes.iter().filter(|c| !c.used).count() as i64)
            .unwrap_or(0))
    }
}
