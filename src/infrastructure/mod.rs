//! Infrastructure layer - Storage backends, services and logging

pub mod logging;
pub mod storage;
pub mod user;
