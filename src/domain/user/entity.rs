//! User entity and related types

use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::patch::Patch;
use super::validation::{UserValidationError, validate_email, validate_name, validate_user_id};
use crate::domain::storage::{StorageEntity, StorageKey};

/// User identifier - a UUID v4 string assigned at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse an existing UserId
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for UserId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Partial update of a user; every field defaults to `Patch::Absent`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub name: Patch<String>,
    pub age: Patch<Number>,
    pub address: Patch<String>,
    pub profession: Patch<String>,
    pub email: Patch<String>,
}

impl UserUpdate {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_absent()
            && self.age.is_absent()
            && self.address.is_absent()
            && self.profession.is_absent()
            && self.email.is_absent()
    }
}

/// User record
///
/// `age` is any JSON number. Integers, fractions and negative values are kept
/// exactly as they were sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    age: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profession: Option<String>,
    email: String,
}

impl User {
    /// Create a new user with the required fields
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        age: impl Into<Number>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age: age.into(),
            address: None,
            profession: None,
            email: email.into(),
        }
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    pub fn with_profession(mut self, profession: Option<String>) -> Self {
        self.profession = profession;
        self
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> &Number {
        &self.age
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn profession(&self) -> Option<&str> {
        self.profession.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Check the field rules that apply to every stored user
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        Ok(())
    }

    /// Apply the supplied fields of `update`, then re-validate.
    ///
    /// The id is never touched. On error the user may be partially modified,
    /// so callers apply updates to a copy.
    pub fn apply(&mut self, update: UserUpdate) -> Result<(), UserValidationError> {
        match update.name {
            Patch::Absent => {}
            Patch::Null => return Err(UserValidationError::NullRequiredField("name")),
            Patch::Value(name) => self.name = name,
        }

        match update.age {
            Patch::Absent => {}
            Patch::Null => return Err(UserValidationError::NullRequiredField("age")),
            Patch::Value(age) => self.age = age,
        }

        match update.email {
            Patch::Absent => {}
            Patch::Null => return Err(UserValidationError::NullRequiredField("email")),
            Patch::Value(email) => self.email = email,
        }

        match update.address {
            Patch::Absent => {}
            Patch::Null => self.address = None,
            Patch::Value(address) => self.address = Some(address),
        }

        match update.profession {
            Patch::Absent => {}
            Patch::Null => self.profession = None,
            Patch::Value(profession) => self.profession = Some(profession),
        }

        self.validate()
    }
}

impl StorageEntity for User {
    type Key = UserId;

    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
