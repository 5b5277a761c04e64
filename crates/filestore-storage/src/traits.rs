//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use filestore_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidFilename(msg),
            StorageError::WriteFailed(msg) | StorageError::ReadFailed(msg) => {
                AppError::Storage(msg)
            }
            StorageError::ConfigError(msg) => AppError::Config(msg),
        }
    }
}

/// Storage abstraction trait
///
/// The content repository works against this trait so that it never touches the
/// filesystem directly. Implementations must make a completed `write` visible to a
/// subsequent `read` of the same key.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key`, replacing any previous content.
    async fn write(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Read the full content stored under `key`.
    ///
    /// Returns [`StorageError::NotFound`] when nothing is stored under the key, so
    /// callers can tell a missing file apart from an I/O failure.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
