//! Application Layer
//!
//! Use cases orchestrating the two-factor lifecycle over the domain
//! repositories. Each externally triggered operation is one use case and one
//! unit of work.

pub mod begin_setup;
pub mod config;
pub mod confirm_setup;
pub mod disable;
pub mod reauth;
pub mod regenerate_codes;
pub mod status;
pub mod verify_login;

pub use begin_setup::{BeginSetupOutput, BeginSetupUseCase};
pub use confirm_setup::{ConfirmSetupOutput, ConfirmSetupUseCase};
pub use disable::DisableUseCase;
pub use reauth::ReauthGuard;
pub use regenerate_codes::{RegenerateCodesOutput, RegenerateCodesUseCase};
pub use status::{SetupStatusOutput, SetupStatusUseCase};
pub use verify_login::{VerifiedWith, VerifyLoginUseCase};
