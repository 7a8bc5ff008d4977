//! TOTP Secret Value Object
//!
//! Wraps a TOTP secret for two-factor authentication.
//! Uses Google Authenticator compatible settings (SHA-1, 6 digits, 30s step).
//!
//! Skew tolerance is asymmetric: a code for the current step or the
//! immediately preceding step is accepted, a code from a future step is not.
//! This bounds the replay window to two steps while still tolerating a
//! slightly slow client clock.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

/// TOTP configuration constants
pub const TOTP_DIGITS: usize = 6;
pub const TOTP_STEP: u64 = 30;
pub const TOTP_ISSUER: &str = "Inkpress";

/// Time-step index for a unix timestamp
///
/// Stored per account as the last consumed step so a code can be accepted
/// at most once per window (replay defense lives with the caller, not here).
pub fn step_at(now: u64) -> i64 {
    (now / TOTP_STEP) as i64
}

/// Check that a submitted code is exactly six ASCII digits.
///
/// Anything else is rejected before any derivation is computed.
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == TOTP_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

/// TOTP Secret for two-factor authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random TOTP secret (160 bits of CSPRNG entropy)
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from database)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded secret for storage and manual entry
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    /// Create a TOTP instance for this secret
    ///
    /// Skew is 0 here; the one-step-back tolerance is applied explicitly in
    /// [`TotpSecret::verify_at`] so that future codes are never accepted.
    fn to_totp(&self, account_label: &str) -> AppResult<TOTP> {
        validate_label(account_label)?;

        let secret = Secret::Encoded(self.secret_base32.clone());

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            0,
            TOTP_STEP,
            secret
                .to_bytes()
                .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?,
            Some(TOTP_ISSUER.to_string()),
            account_label.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to create TOTP: {}", e)))
    }

    /// Verify a TOTP code at an explicit unix time
    ///
    /// Accepts the code for the current step or exactly one step back.
    /// The caller supplies `now` so this stays a pure function of its inputs.
    pub fn verify_at(&self, code: &str, account_label: &str, now: u64) -> AppResult<bool> {
        Ok(self.matched_step_at(code, account_label, now)?.is_some())
    }

    /// Like [`Self::verify_at`], but reports *which* step the code matched.
    ///
    /// The matched step index is what the caller must record for replay
    /// defense: marking the submission-time step instead would let a
    /// previous-step code be replayed in the following window.
    pub fn matched_step_at(
        &self,
        code: &str,
        account_label: &str,
        now: u64,
    ) -> AppResult<Option<i64>> {
        if !is_valid_code_format(code) {
            return Ok(None);
        }

        let totp = self.to_totp(account_label)?;

        if totp.check(code, now) {
            return Ok(Some(step_at(now)));
        }
        if now >= TOTP_STEP && totp.check(code, now - TOTP_STEP) {
            return Ok(Some(step_at(now - TOTP_STEP)));
        }

        Ok(None)
    }

    /// Generate the code for an explicit unix time (for testing)
    #[cfg(test)]
    pub fn generate_at(&self, account_label: &str, time: u64) -> AppResult<String> {
        let totp = self.to_totp(account_label)?;
        Ok(totp.generate(time))
    }

    /// Generate QR code as base64-encoded PNG
    pub fn qr_png_base64(&self, account_label: &str) -> AppResult<String> {
        let totp = self.to_totp(account_label)?;
        totp.get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to generate QR code: {}", e)))
    }

    /// Get the otpauth:// URL for provisioning
    pub fn otpauth_url(&self, account_label: &str) -> AppResult<String> {
        let totp = self.to_totp(account_label)?;
        Ok(totp.get_url())
    }
}

/// Reject labels that would corrupt the otpauth:// URI
fn validate_label(label: &str) -> AppResult<()> {
    if label.is_empty() {
        return Err(AppError::bad_request("Account label cannot be empty"));
    }
    if label.contains(':') {
        return Err(AppError::bad_request(
            "Account label cannot contain ':' characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "writer@inkpress.blog";

    #[test]
    fn test_totp_secret_generate() {
        let secret = TotpSecret::generate();
        assert!(!secret.as_base32().is_empty());
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code_format("012345"));
        assert!(!is_valid_code_format("12345"));
        assert!(!is_valid_code_format("1234567"));
        assert!(!is_valid_code_format("12345a"));
        assert!(!is_valid_code_format(""));
        assert!(!is_valid_code_format("１２３４５６")); // full-width digits
    }

    #[test]
    fn test_verify_current_step() {
        let secret = TotpSecret::generate();
        let now = 1_700_000_000;

        let code = secret.generate_at(LABEL, now).unwrap();
        assert!(secret.verify_at(&code, LABEL, now).unwrap());
    }

    #[test]
    fn test_verify_one_step_back_accepted() {
        let secret = TotpSecret::generate();
        let now = 1_700_000_000;

        let previous = secret.generate_at(LABEL, now - TOTP_STEP).unwrap();
        assert!(secret.verify_at(&previous, LABEL, now).unwrap());
    }

    #[test]
    fn test_matched_step_reports_the_code_step() {
        let secret = TotpSecret::generate();
        let now = 1_700_000_000;

        let current = secret.generate_at(LABEL, now).unwrap();
        assert_eq!(
            secret.matched_step_at(&current, LABEL, now).unwrap(),
            Some(step_at(now))
        );

        let previous = secret.generate_at(LABEL, now - TOTP_STEP).unwrap();
        if previous != current {
            assert_eq!(
                secret.matched_step_at(&previous, LABEL, now).unwrap(),
                Some(step_at(now) - 1)
            );
        }
    }

    #[test]
    fn test_verify_future_step_rejected() {
        let secret = TotpSecret::generate();
        let now = 1_700_000_000;

        let future = secret.generate_at(LABEL, now + TOTP_STEP).unwrap();
        // A future code may coincide with the current one, so only require
        // rejection when the codes actually differ.
        let current = secret.generate_at(LABEL, now).unwrap();
        let previous = secret.generate_at(LABEL, now - TOTP_STEP).unwrap();
        if future != current && future != previous {
            assert!(!secret.verify_at(&future, LABEL, now).unwrap());
        }
    }

    #[test]
    fn test_verify_two_steps_back_rejected() {
        let secret = TotpSecret::generate();
        let now = 1_700_000_000;

        let stale = secret.generate_at(LABEL, now - 2 * TOTP_STEP).unwrap();
        let current = secret.generate_at(LABEL, now).unwrap();
        let previous = secret.generate_at(LABEL, now - TOTP_STEP).unwrap();
        if stale != current && stale != previous {
            assert!(!secret.verify_at(&stale, LABEL, now).unwrap());
        }
    }

    #[test]
    fn test_verify_wrong_code() {
        let secret = TotpSecret::generate();
        let now = 1_700_000_000;

        let code = secret.generate_at(LABEL, now).unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };
        assert!(!secret.verify_at(wrong, LABEL, now).unwrap());
    }

    #[test]
    fn test_verify_malformed_code_rejected_without_computing() {
        let secret = TotpSecret::generate();
        assert!(!secret.verify_at("12 456", LABEL, 1_700_000_000).unwrap());
        assert!(!secret.verify_at("abcdef", LABEL, 1_700_000_000).unwrap());
    }

    #[test]
    fn test_from_base32_round_trip() {
        let secret = TotpSecret::generate();
        let base32 = secret.as_base32().to_string();

        let restored = TotpSecret::from_base32(base32).unwrap();
        assert_eq!(secret.as_base32(), restored.as_base32());
    }

    #[test]
    fn test_from_base32_invalid() {
        assert!(TotpSecret::from_base32("not base32 at all!!").is_err());
    }

    #[test]
    fn test_qr_and_url() {
        let secret = TotpSecret::generate();
        let qr = secret.qr_png_base64(LABEL).unwrap();
        assert!(!qr.is_empty());

        let url = secret.otpauth_url(LABEL).unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains(TOTP_ISSUER));
    }

    #[test]
    fn test_label_with_colon_rejected() {
        let secret = TotpSecret::generate();
        assert!(secret.otpauth_url("bad:label").is_err());
    }

    #[test]
    fn test_step_at() {
        assert_eq!(step_at(0), 0);
        assert_eq!(step_at(29), 0);
        assert_eq!(step_at(30), 1);
        assert_eq!(step_at(1_700_000_000), 56_666_666);
    }
}
