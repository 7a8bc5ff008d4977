//! Application Configuration
//!
//! Configuration for the two-factor application layer. Time-step and digit
//! parameters are fixed constants in the `totp_secret` value object; this
//! struct carries the knobs an operator may actually want to turn.

use crate::domain::value_object::backup_code::BACKUP_CODE_COUNT;

/// Two-factor application configuration
#[derive(Debug, Clone)]
pub struct TwoFactorConfig {
    /// Backup codes minted per batch
    pub backup_code_count: usize,
    /// Password pepper (optional, application-wide secret, must match the
    /// one the accounts service hashes with)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            backup_code_count: BACKUP_CODE_COUNT,
            password_pepper: None,
        }
    }
}

impl TwoFactorConfig {
    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TwoFactorConfig::default();
        assert_eq!(config.backup_code_count, 10);
        assert!(config.pepper().is_none());
    }
}
