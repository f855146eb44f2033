//! Mock Storage implementation for testing

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parcel_core::{PresignedUrl, StorageBackend};
use parcel_storage::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Records every call and can be told to fail.
#[derive(Default)]
pub struct MockStorage {
    files: Mutex<HashMap<String, (String, Bytes)>>,
    put_calls: AtomicUsize,
    presign_calls: AtomicUsize,
    fail_puts: bool,
    fail_signing: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub fn failing_signing() -> Self {
        Self {
            fail_signing: true,
            ..Self::default()
        }
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn presign_calls(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }

    /// Get content type and data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<(String, Bytes)> {
        self.files.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return Err(StorageError::Unavailable("connection refused".to_string()));
        }
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), (content_type.to_string(), data));
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        self.presign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_signing {
            return Err(StorageError::SigningFailed("credentials expired".to_string()));
        }
        let expires_at = Utc::now() + chrono::Duration::from_std(expires_in).unwrap();
        Ok(PresignedUrl::new(
            format!(
                "https://example.com/mock/{}?expires={}",
                storage_key,
                expires_in.as_secs()
            ),
            expires_at,
        ))
    }

    fn bucket(&self) -> &str {
        "mock"
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
