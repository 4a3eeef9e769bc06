//! API request/response plumbing shared by all handlers

pub mod error;
pub mod json;
pub mod number;

pub use error::{ApiError, ApiErrorResponse};
pub use json::{Json, JsonOrForm};
pub use number::NumberField;
