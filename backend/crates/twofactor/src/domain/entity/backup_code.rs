//! Backup Code Entity
//!
//! Stored form of a single-use recovery code. Only the digest is ever
//! persisted; `used` flips exactly once and never back.

use chrono::{DateTime, Utc};

use crate::domain::value_object::account_id::AccountId;

#[derive(Debug, Clone)]
pub struct BackupCode {
    pub account_id: AccountId,
    /// Hex SHA-256 of the normalized plaintext
    pub digest: String,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BackupCode {
    /// Mint a stored record for a freshly generated code digest
    pub fn mint(account_id: AccountId, digest: String) -> Self {
        Self {
            account_id,
            digest,
            used: false,
            used_at: None,
            created_at: Utc::now(),
        }
    }

    /// Mark as consumed. A used code never becomes unused again.
    pub fn mark_used(&mut self) {
        self.used = true;
        self.used_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_is_unused() {
        let code = BackupCode::mint(AccountId::new(), "digest".to_string());
        assert!(!code.used);
        assert!(code.used_at.is_none());
    }

    #[test]
    fn test_mark_used() {
        let mut code = BackupCode::mint(AccountId::new(), "digest".to_string());
        code.mark_used();
        assert!(code.used);
        assert!(code.used_at.is_some());
    }
}
