//! Two-Factor Authentication Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - TOTP-based 2FA (Google Authenticator compatible)
//! - QR code provisioning with pending-setup confirmation
//! - Single-use backup codes for device-loss recovery
//! - Password reauthentication for every state change
//!
//! ## Security Model
//! - TOTP codes accepted for the current step and one step back only
//! - Each TOTP step is consumed on use, so a code never verifies twice
//! - Backup codes stored as SHA-256 digests and flipped atomically
//! - Secrets are never persisted as enabled until a code is confirmed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::TwoFactorConfig;
pub use error::{TwoFactorError, TwoFactorResult};
pub use infra::postgres::PgTwoFactorRepository;
pub use presentation::router::two_factor_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgTwoFactorRepository as TwoFactorStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}
