//! User CRUD service
//!
//! A small HTTP service managing a single "user" resource:
//! - JSON create, list, get, partial update and delete under `/users`
//! - Email format and uniqueness validation
//! - In-memory or PostgreSQL document storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::User;
use infrastructure::{
    storage::{InMemoryStorage, StorageFactory},
    user::{StorageUserRepository, UserService},
};
use tracing::info;

const USERS_TABLE: &str = "users";

/// Create the application state with the storage backend named by `config`
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = config.storage.to_storage_config()?;

    info!("Storage backend: {}", storage_config.storage_type());

    let storage = StorageFactory::create::<User>(&storage_config, USERS_TABLE).await?;
    let repository = Arc::new(StorageUserRepository::new(storage));

    Ok(AppState::new(Arc::new(UserService::new(repository))))
}

/// Create application state over a fresh in-memory store
pub fn create_in_memory_app_state() -> AppState {
    let storage = Arc::new(InMemoryStorage::<User>::new());
    let repository = Arc::new(StorageUserRepository::new(storage));

    AppState::new(Arc::new(UserService::new(repository)))
}
