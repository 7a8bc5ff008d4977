//! Two-Factor Error Types
//!
//! This module provides 2FA-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Authentication failures are deliberately generic: a wrong code, an
//! expired code, a consumed backup code, and a missing secret all surface as
//! the same variant so callers cannot learn an account's 2FA configuration.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// 2FA-specific result type alias
pub type TwoFactorResult<T> = Result<T, TwoFactorError>;

/// 2FA-specific error variants
#[derive(Debug, Error)]
pub enum TwoFactorError {
    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Submitted code is not a 6-digit code or a well-formed backup code
    #[error("Malformed verification code")]
    InvalidCodeFormat,

    /// Password missing from a reauthenticated request
    #[error("Password is required")]
    MissingPassword,

    /// Invalid code (wrong, expired, replayed, or no secret configured)
    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// Password reauthentication failed
    #[error("Reauthentication failed")]
    ReauthenticationFailed,

    /// Operation requires 2FA to be enabled
    #[error("Two-factor authentication is not enabled")]
    NotEnabled,

    /// No setup is pending confirmation
    #[error("No two-factor setup is pending")]
    NoPendingSetup,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TwoFactorError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TwoFactorError::AccountNotFound => StatusCode::NOT_FOUND,
            TwoFactorError::InvalidCodeFormat | TwoFactorError::MissingPassword => {
                StatusCode::BAD_REQUEST
            }
            TwoFactorError::InvalidTwoFactorCode | TwoFactorError::ReauthenticationFailed => {
                StatusCode::UNAUTHORIZED
            }
            TwoFactorError::NotEnabled | TwoFactorError::NoPendingSetup => {
                StatusCode::PRECONDITION_FAILED
            }
            TwoFactorError::Database(_) | TwoFactorError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TwoFactorError::AccountNotFound => ErrorKind::NotFound,
            TwoFactorError::InvalidCodeFormat | TwoFactorError::MissingPassword => {
                ErrorKind::BadRequest
            }
            TwoFactorError::InvalidTwoFactorCode | TwoFactorError::ReauthenticationFailed => {
                ErrorKind::Unauthorized
            }
            TwoFactorError::NotEnabled | TwoFactorError::NoPendingSetup => {
                ErrorKind::PreconditionFailed
            }
            TwoFactorError::Database(_) | TwoFactorError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            TwoFactorError::Database(e) => {
                tracing::error!(error = %e, "Two-factor database error");
            }
            TwoFactorError::Internal(msg) => {
                tracing::error!(message = %msg, "Two-factor internal error");
            }
            TwoFactorError::InvalidTwoFactorCode => {
                tracing::warn!("Invalid two-factor code submitted");
            }
            TwoFactorError::ReauthenticationFailed => {
                tracing::warn!("Reauthentication rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Two-factor error");
            }
        }
    }
}

impl IntoResponse for TwoFactorError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for TwoFactorError {
    fn from(err: AppError) -> Self {
        TwoFactorError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_share_status() {
        // Wrong code and failed reauth must be indistinguishable by status
        assert_eq!(
            TwoFactorError::InvalidTwoFactorCode.status_code(),
            TwoFactorError::ReauthenticationFailed.status_code(),
        );
    }

    #[test]
    fn test_state_errors_are_precondition_failed() {
        assert_eq!(
            TwoFactorError::NotEnabled.status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            TwoFactorError::NoPendingSetup.status_code(),
            StatusCode::PRECONDITION_FAILED
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            TwoFactorError::InvalidCodeFormat.kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            TwoFactorError::Internal("x".into()).kind(),
            ErrorKind::InternalServerError
        );
    }
}
