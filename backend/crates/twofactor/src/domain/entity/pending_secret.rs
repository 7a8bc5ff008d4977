//! Pending Secret Entity
//!
//! A secret issued by "start setup" that has not yet been confirmed.
//! Persisted keyed by account (at most one in flight; a later "start setup"
//! overwrites it) so the wizard survives process restarts and multiple server
//! instances. Promoted to the active secret on successful verification,
//! discarded on disable or supersession.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{account_id::AccountId, totp_secret::TotpSecret};

#[derive(Debug, Clone)]
pub struct PendingSecret {
    pub account_id: AccountId,
    pub secret: TotpSecret,
    pub issued_at: DateTime<Utc>,
}

impl PendingSecret {
    /// Issue a fresh pending secret for an account
    pub fn issue(account_id: AccountId) -> Self {
        Self {
            account_id,
            secret: TotpSecret::generate(),
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_generates_distinct_secrets() {
        let account_id = AccountId::new();
        let a = PendingSecret::issue(account_id);
        let b = PendingSecret::issue(account_id);
        assert_ne!(a.secret.as_base32(), b.secret.as_base32());
    }
}
