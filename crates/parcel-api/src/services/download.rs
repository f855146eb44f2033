//! Download URL issuer
//!
//! Turns a storage key into a time-limited GET URL. Issuing is a local signing
//! computation: the object is not looked up and nothing is recorded.

use std::sync::Arc;
use std::time::Duration;

use parcel_core::constants::MAX_PRESIGNED_URL_TTL_SECS;
use parcel_core::{AppError, PresignedUrl};
use parcel_storage::Storage;

#[derive(Clone)]
pub struct DownloadUrlIssuer {
    storage: Arc<dyn Storage>,
    default_ttl: Duration,
}

impl DownloadUrlIssuer {
    pub fn new(storage: Arc<dyn Storage>, default_ttl: Duration) -> Self {
        Self {
            storage,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a URL valid for the configured default duration.
    pub async fn issue_default(&self, key: &str) -> Result<PresignedUrl, AppError> {
        self.issue(key, self.default_ttl).await
    }

    /// Issue a presigned GET URL for `key`, valid for `valid_for`.
    ///
    /// `valid_for` must be between one second and seven days. Signing failures
    /// are returned as `SigningFailure` without retrying.
    pub async fn issue(&self, key: &str, valid_for: Duration) -> Result<PresignedUrl, AppError> {
        if key.is_empty() {
            return Err(AppError::InvalidInput(
                "Storage key must not be empty".to_string(),
            ));
        }

        let secs = valid_for.as_secs();
        if secs == 0 || secs > MAX_PRESIGNED_URL_TTL_SECS {
            return Err(AppError::InvalidInput(format!(
                "URL validity must be between 1 and {} seconds",
                MAX_PRESIGNED_URL_TTL_SECS
            )));
        }

        let presigned = self.storage.presigned_get_url(key, valid_for).await?;

        tracing::info!(
            key = %key,
            bucket = %self.storage.bucket(),
            expires_in_secs = secs,
            expires_at = %presigned.expires_at,
            "Download URL issued"
        );

        Ok(presigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_storage::MockStorage;
    use chrono::Utc;
    use parcel_core::ErrorMetadata;

    fn issuer(storage: Arc<MockStorage>) -> DownloadUrlIssuer {
        DownloadUrlIssuer::new(storage, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn issues_url_for_key_with_requested_expiry() {
        let storage = Arc::new(MockStorage::new());
        let issuer = issuer(storage.clone());

        for minutes in [1u64, 5, 60] {
            let before = Utc::now();
            let url = issuer
                .issue("abc_report.pdf", Duration::from_secs(minutes * 60))
                .await
                .unwrap();

            assert!(url.url.contains("abc_report.pdf"));
            let expected = before + chrono::Duration::seconds((minutes * 60) as i64);
            assert!((url.expires_at - expected).num_milliseconds().abs() <= 1000);
        }
    }

    #[tokio::test]
    async fn default_validity_is_sixty_minutes() {
        let storage = Arc::new(MockStorage::new());
        let issuer = issuer(storage);

        let url = issuer.issue_default("abc_report.pdf").await.unwrap();
        assert!(url.url.ends_with("expires=3600"));
        assert_eq!(issuer.default_ttl(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn rejects_empty_key_and_out_of_range_validity() {
        let storage = Arc::new(MockStorage::new());
        let issuer = issuer(storage.clone());

        let err = issuer.issue("", Duration::from_secs(60)).await.unwrap_err();
        assert_eq!(err.http_status_code(), 400);

        for valid_for in [
            Duration::ZERO,
            Duration::from_millis(500),
            Duration::from_secs(MAX_PRESIGNED_URL_TTL_SECS + 1),
        ] {
            let err = issuer.issue("k", valid_for).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }

        assert!(issuer
            .issue("k", Duration::from_secs(MAX_PRESIGNED_URL_TTL_SECS))
            .await
            .is_ok());
        assert_eq!(storage.presign_calls(), 1);
    }

    #[tokio::test]
    async fn signing_failure_propagates_without_retry() {
        let storage = Arc::new(MockStorage::failing_signing());
        let issuer = issuer(storage.clone());

        let err = issuer
            .issue("abc_report.pdf", Duration::from_secs(60))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SigningFailure(_)));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(storage.presign_calls(), 1);
    }

    #[tokio::test]
    async fn missing_object_still_gets_a_url() {
        let storage = Arc::new(MockStorage::new());
        let issuer = issuer(storage.clone());

        assert!(issuer.issue_default("never-uploaded").await.is_ok());
        assert_eq!(storage.put_calls(), 0);
    }
}
