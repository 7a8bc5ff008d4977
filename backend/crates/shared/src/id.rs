//! Common ID Types
//!
//! Type-safe ID wrappers for domain entities.

use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type AccountId = Id<markers::Account>;
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: uuid::Uuid,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID (UUID v4)
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4(),
            _marker: PhantomData,
        }
    }

    /// Create from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    /// Convert to UUID
    pub fn into_uuid(self) -> Uuid {
        self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

/// Marker types for different entity IDs
///
/// Markers must be `Clone + Copy`: the derives on [`Id`] bound their impls
/// on `T`, so a bare unit struct would leave `Id<T>` neither.
pub mod markers {
    /// Marker for account IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Account;
}

#[cfg(test)]
mod tests {
    use super::*;

    type AccountId = Id<markers::Account>;

    #[test]
    fn test_id_new_is_v4() {
        let id = AccountId::new();
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_from_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.into_uuid(), uuid);
    }

    #[test]
    fn test_id_is_copy() {
        // Only compiles if Id<T> is Copy despite the marker being a ZST
        let id = AccountId::new();
        let copied = id;
        assert_eq!(id, copied);
    }

    #[test]
    fn test_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }
}
