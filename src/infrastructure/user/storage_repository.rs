//! Storage-backed user repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::storage::Storage;
use crate::domain::user::{User, UserId, UserRepository, UserUpdate};

/// Storage-backed implementation of UserRepository
#[derive(Debug)]
pub struct StorageUserRepository {
    storage: Arc<dyn Storage<User>>,
}

impl StorageUserRepository {
    /// Create a new storage-backed repository
    pub fn new(storage: Arc<dyn Storage<User>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl UserRepository for StorageUserRepository {
    async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.storage.list().await
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.storage.get(id).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.storage.create(user).await
    }

    async fn update(&self, id: &UserId, update: UserUpdate) -> Result<Option<User>, DomainError> {
        self.storage
            .update_with(
                id,
                Box::new(move |user: &mut User| user.apply(update).map_err(DomainError::from)),
            )
            .await
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.storage.count().await
    }
}
