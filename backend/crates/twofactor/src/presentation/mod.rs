//! Presentation Layer
//!
//! HTTP handlers, DTOs, and router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::{CurrentAccount, TwoFactorAppState};
pub use router::{two_factor_router, two_factor_router_generic};
