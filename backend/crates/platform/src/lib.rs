//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG, SHA-256, hex)
//! - Password verification (Argon2id, NIST SP 800-63B compliant)

pub mod crypto;
pub mod password;
