#[cfg(feature = "storage-memory")]
use crate::InMemoryStorage;
#[cfg(feature = "storage-s3")]
use crate::{S3Credentials, S3Storage};
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use parcel_core::Config;
use std::sync::Arc;

/// Bucket name used by the memory backend when `S3_BUCKET` is unset.
#[cfg(feature = "storage-memory")]
const DEFAULT_MEMORY_BUCKET: &str = "uploads";

/// Create a storage backend based on configuration
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let backend = config.storage_backend().unwrap_or(StorageBackend::S3);

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .or_else(|| config.aws_region().map(String::from))
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);
            let credentials = match (config.aws_access_key_id(), config.aws_secret_access_key()) {
                (Some(access_key_id), Some(secret_access_key)) => Some(S3Credentials {
                    access_key_id: access_key_id.to_string(),
                    secret_access_key: secret_access_key.to_string(),
                }),
                _ => None,
            };

            let storage = S3Storage::new(bucket, region, endpoint, credentials)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => {
            let bucket = config.s3_bucket().unwrap_or(DEFAULT_MEMORY_BUCKET);
            if config.memory_signing_secret().is_none() {
                tracing::warn!(
                    "MEMORY_SIGNING_SECRET not set; presigned URLs are signed with a random per-process key"
                );
            }
            let storage = InMemoryStorage::new(bucket, config.memory_signing_secret());
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)"
                .to_string(),
        )),
    }
}
