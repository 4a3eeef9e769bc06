//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::DomainError;

/// Unanchored `<something>@<something>.<something>` check
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r".+@.+\..+").unwrap());

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Name, age, and email are required.")]
    MissingRequiredFields,

    #[error("User ID '{0}' is not a valid identifier")]
    InvalidId(String),

    #[error("Field '{0}' is required and cannot be null")]
    NullRequiredField(&'static str),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate a user ID
///
/// IDs are generated as UUID v4 strings, so anything that does not parse
/// as a UUID cannot refer to a stored user.
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| UserValidationError::InvalidId(id.to_string()))
}

pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.is_empty() {
        return Err(UserValidationError::EmptyName);
    }

    Ok(())
}

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - Must contain `@` followed later by a `.`, with at least one character
///   before, between and after them
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}
