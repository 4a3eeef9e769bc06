//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::StorageEntity;

/// In-place change applied by `Storage::update_with`
pub type EntityUpdate<E> = Box<dyn FnOnce(&mut E) -> Result<(), DomainError> + Send>;

/// Generic document storage trait for CRUD operations on any entity type.
///
/// Implementations enforce `StorageEntity::UNIQUE_FIELDS` on `create` and
/// `update_with` and report violations as `DomainError::Conflict` without
/// persisting anything.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities, in no guaranteed order
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Creates a new entity, returns error if already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Loads the entity, applies `update` and stores the result as one atomic
    /// step. Writers to the same key are serialized, so no change is lost.
    ///
    /// Returns `Ok(None)` without calling `update` when the key is unknown.
    /// Nothing is stored when `update` fails or changes the key.
    async fn update_with(
        &self,
        key: &E::Key,
        update: EntityUpdate<E>,
    ) -> Result<Option<E>, DomainError>;

    /// Deletes an entity by its key, returns true if deleted
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    /// Returns the count of entities
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}
