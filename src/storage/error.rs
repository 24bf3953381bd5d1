//! Storage error types
//!
//! Defines all errors that can occur in the persistence layer. None of
//! these reach the user: the store logs them and degrades to defaults.

use thiserror::Error;

/// Errors that can occur while loading or saving the persisted document
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored payload is not a valid document
    #[error("Corrupt data: {0}")]
    Corruption(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
