//! Per-user credential persistence port.

use crate::domain::entities::{AccessToken, UserId};
use crate::domain::errors::StoreError;

/// Port for the user id → token mapping.
///
/// Operations are local and short; they do not suspend.
pub trait CredentialStorePort: Send + Sync {
    /// Inserts or replaces the token for a user and persists it.
    ///
    /// # Errors
    /// Returns error if the durable write fails.
    fn save(&self, user_id: &UserId, token: &AccessToken) -> Result<(), StoreError>;

    /// Returns the stored token, if any.
    fn get(&self, user_id: &UserId) -> Option<AccessToken>;

    /// Removes the token and reports whether one was stored.
    ///
    /// # Errors
    /// Returns error if the durable write fails.
    fn delete(&self, user_id: &UserId) -> Result<bool, StoreError>;
}
