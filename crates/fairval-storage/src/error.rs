//! Storage error types.

use thiserror::Error;

/// Storage operation result type.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error types.
///
/// `Transient` is the retryable class: the orchestrator retries the
/// transactional result-write once with backoff on it. Everything else is
/// terminal for the affected operation.
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    /// Connection or transaction failure that may succeed on retry.
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Record not found.
    #[error("Record not found: {entity_type} with key '{key}'")]
    NotFound {
        /// The type of entity (e.g. "Security", "Run").
        entity_type: &'static str,
        /// The key that was not found.
        key: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Uniqueness constraint violated.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Unrecoverable backend failure.
    #[error("Store failure: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            key: key.into(),
        }
    }

    /// True when the operation is worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
