//! Upload service
//!
//! Pipeline: validate (size, then content type) → generate key → store.
//! A rejected upload never reaches the store.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use parcel_core::{AppError, StorageKey, UploadPolicy};
use parcel_storage::Storage;

/// A file received from a client, before validation.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct UploadService {
    policy: Arc<UploadPolicy>,
    storage: Arc<dyn Storage>,
}

impl UploadService {
    pub fn new(policy: UploadPolicy, storage: Arc<dyn Storage>) -> Self {
        Self {
            policy: Arc::new(policy),
            storage,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate the upload, store it under a fresh key, and return the key.
    ///
    /// Store failures are returned as `StoreUnavailable` without retrying.
    #[tracing::instrument(
        skip(self, request),
        fields(
            filename = %request.filename,
            content_type = ?request.content_type,
            size_bytes = request.data.len()
        )
    )]
    pub async fn upload(&self, request: UploadRequest) -> Result<StorageKey, AppError> {
        let size = request.data.len() as u64;
        let content_type = request.content_type.as_deref();

        let key = self
            .policy
            .validate_and_key(size, content_type, &request.filename)?;

        // validate_and_key rejects a missing content type
        let content_type = content_type.unwrap_or_default();

        let start = Instant::now();
        self.storage
            .put(key.as_str(), content_type, request.data)
            .await?;

        tracing::info!(
            key = %key,
            bucket = %self.storage.bucket(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_storage::MockStorage;
    use parcel_core::ErrorMetadata;
    use std::collections::HashSet;

    const MIB: usize = 1024 * 1024;

    fn request(filename: &str, content_type: Option<&str>, size: usize) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            content_type: content_type.map(str::to_string),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    fn service(storage: Arc<MockStorage>) -> UploadService {
        UploadService::new(UploadPolicy::default(), storage)
    }

    #[tokio::test]
    async fn accepted_upload_is_stored_under_returned_key() {
        let storage = Arc::new(MockStorage::new());
        let service = service(storage.clone());

        let key = service
            .upload(request("photo.png", Some("image/png"), 5 * MIB))
            .await
            .unwrap();

        assert!(key.as_str().ends_with("_photo.png"));
        assert_eq!(storage.put_calls(), 1);
        let (content_type, data) = storage.get_file(key.as_str()).unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(data.len(), 5 * MIB);
    }

    #[tokio::test]
    async fn oversized_upload_never_reaches_store() {
        let storage = Arc::new(MockStorage::new());
        let service = service(storage.clone());

        let err = service
            .upload(request("big.pdf", Some("application/pdf"), 11 * MIB))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge { .. }));
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(storage.put_calls(), 0);
    }

    #[tokio::test]
    async fn disallowed_or_missing_type_never_reaches_store() {
        let storage = Arc::new(MockStorage::new());
        let service = service(storage.clone());

        for content_type in [Some("application/zip"), None, Some("")] {
            let err = service
                .upload(request("archive.zip", content_type, 1024))
                .await
                .unwrap_err();
            assert_eq!(err.http_status_code(), 415);
        }
        assert_eq!(storage.put_calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_unavailable() {
        let storage = Arc::new(MockStorage::failing_puts());
        let service = service(storage.clone());

        let err = service
            .upload(request("notes.txt", Some("text/plain"), 10))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert_eq!(storage.put_calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_identical_uploads_get_distinct_keys() {
        let storage = Arc::new(MockStorage::new());
        let service = service(storage.clone());

        let (a, b) = tokio::join!(
            service.upload(request("notes.txt", Some("text/plain"), 10)),
            service.upload(request("notes.txt", Some("text/plain"), 10)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a, b);
        assert_eq!(storage.put_calls(), 2);
        assert!(storage.get_file(a.as_str()).is_some());
        assert!(storage.get_file(b.as_str()).is_some());
    }

    #[tokio::test]
    async fn many_uploads_produce_unique_keys() {
        let storage = Arc::new(MockStorage::new());
        let service = service(storage.clone());

        let mut keys = HashSet::new();
        for _ in 0..500 {
            let key = service
                .upload(request("same.txt", Some("text/plain"), 1))
                .await
                .unwrap();
            keys.insert(key);
        }
        assert_eq!(keys.len(), 500);
    }
}
