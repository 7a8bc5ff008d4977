//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Setup Status
// ============================================================================

/// Setup status response (projection of the lifecycle state)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatusResponse {
    pub enabled: bool,
    /// A secret has been issued and awaits confirmation
    pub pending_setup: bool,
    pub backup_codes_remaining: i64,
}

// ============================================================================
// Setup Wizard
// ============================================================================

/// Begin-setup response: provisioning material for the authenticator app
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginSetupResponse {
    /// QR code as base64-encoded PNG
    pub qr_code: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// Confirm-setup request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSetupRequest {
    /// 6-digit code from the authenticator app
    pub code: String,
}

/// Backup codes response
///
/// The only place plaintext codes ever appear; they are not retrievable
/// again after this response is rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodesResponse {
    pub backup_codes: Vec<String>,
}

// ============================================================================
// Login Verification
// ============================================================================

/// Login-time verification request (TOTP code or backup code)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLoginRequest {
    pub code: String,
}

/// Login-time verification response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLoginResponse {
    pub verified: bool,
    /// "totp" or "backupCode"
    pub method: String,
}

// ============================================================================
// Destructive Operations (reauthenticated)
// ============================================================================

/// Disable request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableRequest {
    /// Current account password
    pub password: String,
}

/// Disable response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableResponse {
    pub disabled: bool,
}

/// Regenerate backup codes request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateCodesRequest {
    /// Current account password
    pub password: String,
}
