//! User repository trait

use async_trait::async_trait;

use super::entity::{User, UserId, UserUpdate};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence gateway for users.
///
/// `create` and `update` surface unique-constraint violations (duplicate email)
/// as `DomainError::Conflict`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List all users, in no guaranteed order
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Get a user by ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Apply `update` to the stored user in one atomic step and return the
    /// result, or `None` when no user has `id`. Validation failures surface as
    /// `DomainError::Validation` and leave the stored user untouched.
    async fn update(&self, id: &UserId, update: UserUpdate) -> Result<Option<User>, DomainError>;

    /// Delete a user, returns false if it did not exist
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// Count users
    async fn count(&self) -> Result<usize, DomainError>;
}
