use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use parcel_core::PresignedUrl;
use std::time::{Duration, Instant};

/// Format of the `X-Amz-Date` query parameter in SigV4 presigned URLs.
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Static access key pair. When absent the AWS default chain (environment) is used.
#[derive(Clone)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Optional static credentials; overrides the environment
    ///
    /// Requests use path-style addressing (`{endpoint}/{bucket}/{key}`), which
    /// MinIO requires.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<S3Credentials>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone())
            .with_virtual_hosted_style_request(false);

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        if let Some(credentials) = credentials {
            builder = builder
                .with_access_key_id(credentials.access_key_id)
                .with_secret_access_key(credentials.secret_access_key);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::debug!(
            bucket = %bucket,
            region = %region,
            endpoint = ?endpoint_url,
            "S3 storage configured"
        );

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }
}

/// Map a storage key onto an object location whose S3 key is byte-for-byte
/// the storage key. Keys `object_store` would reshape (empty or `.`/`..`
/// segments, leading or trailing `/`, control characters) are refused.
fn object_location(storage_key: &str) -> StorageResult<Path> {
    validate_storage_key(storage_key)?;

    let location = Path::parse(storage_key)
        .map_err(|e| StorageError::InvalidKey(format!("unsupported storage key: {}", e)))?;
    if location.as_ref() != storage_key {
        return Err(StorageError::InvalidKey(format!(
            "unsupported storage key: {}",
            storage_key
        )));
    }
    Ok(location)
}

/// Read the signing instant from a SigV4 URL's `X-Amz-Date` parameter.
fn signed_at(url: &url::Url) -> Option<DateTime<Utc>> {
    url.query_pairs()
        .find(|(name, _)| name == "X-Amz-Date")
        .and_then(|(_, value)| NaiveDateTime::parse_from_str(&value, AMZ_DATE_FORMAT).ok())
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes) -> StorageResult<()> {
        let location = object_location(storage_key)?;
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = Instant::now();

        self.store
            .put_opts(&location, PutPayload::from(data), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::Unavailable(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        let location = object_location(storage_key)?;

        let ttl = chrono::Duration::from_std(expires_in)
            .map_err(|e| StorageError::SigningFailed(format!("invalid expiry: {}", e)))?;
        let requested_at = Utc::now();

        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 presign failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        let expires_at = signed_at(&url).unwrap_or(requested_at) + ttl;

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            expires_at = %expires_at,
            "S3 presigned URL generated"
        );

        Ok(PresignedUrl::new(url.to_string(), expires_at))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
