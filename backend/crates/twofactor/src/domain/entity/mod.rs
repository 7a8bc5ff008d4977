//! Domain Entities

pub mod account;
pub mod backup_code;
pub mod pending_secret;
pub mod two_factor;
