//! Account Entity (external collaborator projection)
//!
//! The account itself is owned by the accounts service; this subsystem only
//! reads the fields it needs: a provisioning label and the password hash used
//! for reauthentication.

use platform::password::HashedPassword;

use crate::domain::value_object::account_id::AccountId;

/// Read-only view of an account
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    /// Label embedded in the provisioning URI (handle or email)
    pub label: String,
    /// Argon2id password hash, verified on destructive transitions
    pub password_hash: HashedPassword,
}
