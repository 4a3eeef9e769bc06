//! User infrastructure module
//!
//! Storage-backed user repository and the user service that validates
//! requests before they reach storage.

mod service;
mod storage_repository;

pub use service::{CreateUserRequest, UserService};
pub use storage_repository::StorageUserRepository;
