//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;

    /// Position of the entity among its siblings
    fn index(&self) -> i32;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Target is absent, or not owned by the acting user.
    #[error("not found: {0}")]
    NotFound(String),
    /// Requested position lies outside `0..=max` of its scope.
    #[error("invalid index {index}: expected a value in 0..={max}")]
    InvalidIndex { index: i32, max: i32 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The store could not apply the unit of work; nothing was committed.
    #[error("store failure: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal(format!("categories encoding: {}", err))
    }
}
