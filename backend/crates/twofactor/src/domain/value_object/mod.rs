//! Value Objects

pub mod account_id;
pub mod backup_code;
pub mod totp_secret;
