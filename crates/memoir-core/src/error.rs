//! Domain-level error types.

use thiserror::Error;

use crate::domain::ParseCategoryError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] RepoError),
}

impl From<ParseCategoryError> for DomainError {
    fn from(err: ParseCategoryError) -> Self {
        DomainError::Validation(err.to_string())
    }
}

/// Repository-level errors.
///
/// Only write paths and the networked backend produce these; file reads
/// degrade to an empty collection instead.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<std::io::Error> for RepoError {
    fn from(err: std::io::Error) -> Self {
        RepoError::Io(err.to_string())
    }
}
