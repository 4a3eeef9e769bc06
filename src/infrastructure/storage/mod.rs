//! Storage infrastructure - Storage implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStorage;
pub use postgres::{PostgresConfig, PostgresStorage};

use crate::domain::DomainError;

/// Error reported when a write would duplicate a unique field value
fn unique_violation(field: &str, value: &serde_json::Value) -> DomainError {
    let shown = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
    DomainError::conflict(format!("{} '{}' already exists", field, shown))
}
