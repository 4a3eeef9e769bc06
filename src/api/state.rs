//! Application state for shared services

use std::sync::Arc;

use crate::domain::DomainError;
use crate::domain::user::{User, UserRepository, UserUpdate};
use crate::infrastructure::user::{CreateUserRequest, UserService};

/// Application state holding the injected services.
///
/// Built once at startup and cloned into every request; nothing here is
/// global, so tests construct their own state over an in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn list(&self) -> Result<Vec<User>, DomainError> {
        UserService::list(self).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, DomainError> {
        UserService::update(self, id, update).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        UserService::delete(self, id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }
}
