//! User domain
//!
//! Domain types and traits for the user resource: the entity, partial
//! updates, validation rules and the repository trait.

mod entity;
mod patch;
mod repository;
mod validation;

pub use entity::{User, UserId, UserUpdate};
pub use patch::Patch;
pub use repository::UserRepository;
pub use validation::{UserValidationError, validate_email, validate_name, validate_user_id};

#[cfg(test)]
pub use repository::MockUserRepository;
