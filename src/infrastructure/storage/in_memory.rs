//! In-memory storage implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;
use crate::domain::storage::{EntityUpdate, Storage, StorageEntity, StorageKey};

use super::unique_violation;

/// Thread-safe in-memory storage implementation
///
/// Unique fields are checked under the write lock, so concurrent writers
/// racing for the same value see exactly one winner. Data is lost when the
/// process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }
}

fn to_document<E: StorageEntity>(entity: &E) -> Result<Value, DomainError> {
    serde_json::to_value(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))
}

/// Reject `entity` if another stored entity shares one of its unique field values
fn check_unique<E: StorageEntity>(
    entities: &HashMap<String, E>,
    entity: &E,
) -> Result<(), DomainError> {
    if E::UNIQUE_FIELDS.is_empty() {
        return Ok(());
    }

    let key = entity.key().as_str();
    let document = to_document(entity)?;

    for (other_key, other) in entities {
        if other_key == key {
            continue;
        }

        let other_document = to_document(other)?;

        for field in E::UNIQUE_FIELDS {
            let value = match document.get(*field) {
                Some(value) if !value.is_null() => value,
                _ => continue,
            };

            if other_document.get(*field) == Some(value) {
                return Err(unique_violation(field, value));
            }
        }
    }

    Ok(())
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let entities = self.entities.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entities.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entities.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        check_unique(&entities, &entity)?;

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update_with(
        &self,
        key: &E::Key,
        update: EntityUpdate<E>,
    ) -> Result<Option<E>, DomainError> {
        let mut entities = self.entities.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(current) = entities.get(key.as_str()) else {
            return Ok(None);
        };

        let mut entity = current.clone();
        update(&mut entity)?;

        if entity.key() != key {
            return Err(DomainError::internal(format!(
                "Update changed the key of entity '{}'",
                key.as_str()
            )));
        }

        check_unique(&entities, &entity)?;

        entities.insert(key.as_str().to_string(), entity.clone());
        Ok(Some(entity))
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let mut entities = self.entities.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(entities.remove(key.as_str()).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let entities = self.entities.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entities.len())
    }

}
