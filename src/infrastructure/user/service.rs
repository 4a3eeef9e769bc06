//! User service for validation and user management

use std::sync::Arc;

use serde_json::Number;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::user::{User, UserId, UserRepository, UserUpdate, UserValidationError};

/// Request for creating a new user
///
/// Required fields are optional here so that a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub age: Option<Number>,
    pub address: Option<String>,
    pub profession: Option<String>,
    pub email: Option<String>,
}

/// User service
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

fn not_found() -> DomainError {
    DomainError::not_found("User not found")
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Get a user by ID. An ID that cannot be parsed resolves to nothing.
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        match UserId::new(id) {
            Ok(user_id) => self.repository.get(&user_id).await,
            Err(_) => Ok(None),
        }
    }

    /// Create a new user with a freshly generated ID
    ///
    /// `name` and `email` must be non-empty and `age` must be present. Any
    /// number counts as present, so an age of `0` is accepted on create just
    /// as it is on update.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let name = request.name.filter(|name| !name.is_empty());
        let email = request.email.filter(|email| !email.is_empty());

        let (Some(name), Some(age), Some(email)) = (name, request.age, email) else {
            return Err(UserValidationError::MissingRequiredFields.into());
        };

        let user = User::new(UserId::generate(), name, age, email)
            .with_address(request.address)
            .with_profession(request.profession);

        user.validate()?;

        debug!(id = %user.id(), "Creating user");
        self.repository.create(user).await
    }

    /// Apply a partial update to an existing user
    ///
    /// Fails with NotFound before looking at the update when the ID does not
    /// resolve. The read, patch and write happen atomically in storage, so
    /// concurrent updates to different fields all survive. Nothing is
    /// persisted when validation fails.
    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<User, DomainError> {
        let user_id = UserId::new(id).map_err(|_| not_found())?;

        if update.is_empty() {
            debug!(id = %user_id, "Empty update, returning user unchanged");
            return self.repository.get(&user_id).await?.ok_or_else(not_found);
        }

        self.repository
            .update(&user_id, update)
            .await?
            .ok_or_else(not_found)
    }

    /// Delete a user, returns false if it did not exist
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        match UserId::new(id) {
            Ok(user_id) => self.repository.delete(&user_id).await,
            Err(_) => Ok(false),
        }
    }

    /// Count users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
