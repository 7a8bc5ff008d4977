//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of sensitive data
//! - Constant-time comparison
//!
//! Password *creation* policy (minimum length, breach checks) lives with the
//! account service; this crate only needs to re-verify an already-accepted
//! password, so validation here is limited to what makes verification sound.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password input errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordInputError {
    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains invalid characters (control characters)
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// This type ensures that password data is securely erased from memory
/// when the value is dropped, preventing memory inspection attacks.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password
    ///
    /// Unicode is normalized using NFKC before validation, so the same
    /// password verifies regardless of the client's composition form.
    pub fn new(raw: String) -> Result<Self, PasswordInputError> {
        // NIST: Unicode NFKC normalization before processing
        let normalized: String = raw.nfkc().collect();

        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return Err(PasswordInputError::EmptyOrWhitespace);
        }

        // NIST: Count Unicode code points (not bytes)
        let char_count = normalized.chars().count();
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordInputError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Check for control characters (except space, tab, newline)
        for ch in normalized.chars() {
            if ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n' {
                return Err(PasswordInputError::InvalidCharacter);
            }
        }

        Ok(Self(normalized))
    }

    /// Get the password as bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password using Argon2id
    ///
    /// ## Arguments
    /// * `pepper` - Optional application-wide secret for additional security
    ///
    /// ## Returns
    /// PHC-formatted hash string wrapped in `HashedPassword`
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let password_bytes = match pepper {
            Some(p) => {
                let mut combined = self.as_bytes().to_vec();
                combined.extend_from_slice(p);
                combined
            }
            None => self.as_bytes().to_vec(),
        };

        // Generate random salt (128 bits = 16 bytes)
        let salt = SaltString::generate(OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(&password_bytes, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// This type stores the Argon2id hash in PHC format, which includes:
/// - Algorithm identifier
/// - Version
/// - Parameters (memory, iterations, parallelism)
/// - Salt
/// - Hash
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();

        // Validate it's a valid PHC string
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// ## Arguments
    /// * `password` - The clear text password to verify
    /// * `pepper` - Optional pepper (must match the one used during hashing)
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let password_bytes = match pepper {
            Some(p) => {
                let mut combined = password.as_bytes().to_vec();
                combined.extend_from_slice(p);
                combined
            }
            None => password.as_bytes().to_vec(),
        };

        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        let argon2 = Argon2::default();

        // Argon2 uses constant-time comparison internally
        argon2
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("correct horse battery staple".to_string()).unwrap();
        let hashed = password.hash(None).unwrap();

        assert!(hashed.verify(&password, None));

        let wrong = ClearTextPassword::new("incorrect horse".to_string()).unwrap();
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_pepper_must_match() {
        let password = ClearTextPassword::new("correct horse battery staple".to_string()).unwrap();
        let hashed = password.hash(Some(b"pepper-a")).unwrap();

        let same = ClearTextPassword::new("correct horse battery staple".to_string()).unwrap();
        assert!(hashed.verify(&same, Some(b"pepper-a")));
        assert!(!hashed.verify(&same, Some(b"pepper-b")));
        assert!(!hashed.verify(&same, None));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(
            ClearTextPassword::new("   ".to_string()).unwrap_err(),
            PasswordInputError::EmptyOrWhitespace
        );
    }

    #[test]
    fn test_control_characters_rejected() {
        assert_eq!(
            ClearTextPassword::new("pass\u{0007}word".to_string()).unwrap_err(),
            PasswordInputError::InvalidCharacter
        );
    }

    #[test]
    fn test_too_long_rejected() {
        let raw = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(matches!(
            ClearTextPassword::new(raw).unwrap_err(),
            PasswordInputError::TooLong { .. }
        ));
    }

    #[test]
    fn test_nfkc_normalization() {
        // U+FB01 LATIN SMALL LIGATURE FI normalizes to "fi"
        let composed = ClearTextPassword::new("\u{FB01}sh and chips".to_string()).unwrap();
        let hashed = composed.hash(None).unwrap();

        let decomposed = ClearTextPassword::new("fish and chips".to_string()).unwrap();
        assert!(hashed.verify(&decomposed, None));
    }

    #[test]
    fn test_phc_round_trip() {
        let password = ClearTextPassword::new("correct horse battery staple".to_string()).unwrap();
        let hashed = password.hash(None).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password, None));
    }

    #[test]
    fn test_invalid_phc_string() {
        assert!(HashedPassword::from_phc_string("not-a-phc-string").is_err());
    }
}
