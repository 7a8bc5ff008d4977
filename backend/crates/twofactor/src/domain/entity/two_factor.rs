//! Two-Factor Entity
//!
//! Per-account 2FA state. The lifecycle is
//! `Disabled → PendingSetup → Enabled → Disabled`; the pending half lives in
//! [`crate::domain::entity::pending_secret::PendingSecret`], this entity holds
//! the confirmed state. State transitions themselves are repository
//! transactions so that partial states can never be observed.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{account_id::AccountId, totp_secret::TotpSecret};

/// Confirmed 2FA state for one account
#[derive(Debug, Clone)]
pub struct TwoFactor {
    pub account_id: AccountId,
    /// True only after a secret has been confirmed with a valid code
    pub enabled: bool,
    /// Present while enabled; cleared atomically on disable
    pub secret: Option<TotpSecret>,
    /// Last consumed time-step index (replay defense)
    pub last_used_step: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TwoFactor {
    /// Fresh disabled state for an account that never set up 2FA
    pub fn disabled(account_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            enabled: false,
            secret: None,
            last_used_step: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The active secret, or `None` unless 2FA is confirmed
    ///
    /// A secret that exists but was never confirmed must not verify logins;
    /// all login-time callers go through this accessor.
    pub fn active_secret(&self) -> Option<&TotpSecret> {
        if self.enabled { self.secret.as_ref() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_state() {
        let tf = TwoFactor::disabled(AccountId::new());
        assert!(!tf.enabled);
        assert!(tf.secret.is_none());
        assert!(tf.active_secret().is_none());
    }

    #[test]
    fn test_unconfirmed_secret_is_not_active() {
        let mut tf = TwoFactor::disabled(AccountId::new());
        tf.secret = Some(TotpSecret::generate());
        // enabled is still false, so the secret must not be treated as active
        assert!(tf.active_secret().is_none());

        tf.enabled = true;
        assert!(tf.active_secret().is_some());
    }
}
