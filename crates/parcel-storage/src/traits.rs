//! Storage abstraction trait
//!
//! This module defines the narrow capability the gateway needs from an object
//! store: write an object, and mint a time-limited GET URL for it.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use parcel_core::{AppError, PresignedUrl};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or refused the write.
    #[error("Object store unavailable: {0}")]
    Unavailable(String),

    /// Credentials or clock problems while computing a signature.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// A presigned URL was rejected (bad signature or expired).
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StorageError::AccessDenied(msg) => AppError::StoreUnavailable(msg),
            StorageError::SigningFailed(msg) => AppError::SigningFailure(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Storage abstraction trait
///
/// Every backend is bound to one bucket at construction time. Keys are opaque
/// strings produced by the upload policy and are never rewritten.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key` with the given content type.
    ///
    /// Writing an existing key replaces the object.
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes) -> StorageResult<()>;

    /// Create a presigned GET URL for `storage_key` valid for `expires_in`.
    ///
    /// This is a local signing computation; the object is not required to exist.
    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl>;

    /// Bucket this backend writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
