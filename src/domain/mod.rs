//! Domain layer - Core business logic and entities

pub mod error;
pub mod storage;
pub mod user;

pub use error::DomainError;
pub use storage::{EntityUpdate, Storage, StorageEntity, StorageKey};
pub use user::{Patch, User, UserId, UserRepository, UserUpdate, UserValidationError};
