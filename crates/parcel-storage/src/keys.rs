//! Shared key checks for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys no backend can address. Everything else is passed through as-is.
pub fn validate_storage_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey(
            "storage key must not be empty".to_string(),
        ));
    }
    Ok(())
}
