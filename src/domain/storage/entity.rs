//! Storage entity traits and types

use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};

/// Trait for types that can be used as storage keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// Returns the key as a string for storage backends that require string keys
    fn as_str(&self) -> &str;
}

/// Trait for documents that can be stored
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    /// The key type for this entity
    type Key: StorageKey;

    /// Top-level document fields whose values must be unique across the collection.
    /// Absent and null values are never considered duplicates.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Returns the entity's key
    fn key(&self) -> &Self::Key;
}
