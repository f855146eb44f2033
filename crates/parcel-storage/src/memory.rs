//! In-memory storage backend.
//!
//! Objects live in a process-local map. Presigned URLs have the shape
//! `memory://{bucket}/{encoded-key}?X-Amz-Date=..&X-Amz-Expires=..&X-Amz-Signature=..`
//! and carry an HMAC-SHA256 signature over the bucket, key, signing time and
//! expiry. [`InMemoryStorage::fetch_presigned`] redeems such a URL the way an
//! object store would: bad signatures and expired URLs are refused.

use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use hmac::{Hmac, Mac};
use parcel_core::PresignedUrl;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

type HmacSha256 = Hmac<Sha256>;

const URL_SCHEME: &str = "memory";
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A stored object and its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Bytes,
}

/// Process-local object store with self-verifiable presigned URLs.
pub struct InMemoryStorage {
    bucket: String,
    signing_key: Vec<u8>,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryStorage {
    /// Create a store for `bucket`. URLs are signed with `signing_secret`, or
    /// with a random per-process key when none is given.
    pub fn new(bucket: impl Into<String>, signing_secret: Option<&str>) -> Self {
        let signing_key = match signing_secret {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => rand::random::<[u8; 32]>().to_vec(),
        };

        Self {
            bucket: bucket.into(),
            signing_key,
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch an object directly, bypassing URL signing.
    pub async fn get(&self, storage_key: &str) -> StorageResult<StoredObject> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Redeem a presigned URL issued by this store at the current time.
    pub async fn fetch_presigned(&self, url: &str) -> StorageResult<StoredObject> {
        self.fetch_presigned_at(url, Utc::now()).await
    }

    /// Redeem a presigned URL as if the request arrived at `now`.
    pub async fn fetch_presigned_at(
        &self,
        url: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<StoredObject> {
        let request = self.verify(url)?;

        if now >= request.expires_at {
            tracing::debug!(
                key = %request.key,
                expires_at = %request.expires_at,
                "Rejected expired presigned URL"
            );
            return Err(StorageError::AccessDenied("Request has expired".to_string()));
        }

        self.get(&request.key).await
    }

    fn signature(&self, key: &str, amz_date: &str, expires_secs: u64) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(format!("GET\n{}\n{}\n{}\n{}", self.bucket, key, amz_date, expires_secs).as_bytes());
        Ok(mac)
    }

    /// Check the URL's shape and signature and return what it grants.
    fn verify(&self, raw_url: &str) -> StorageResult<VerifiedRequest> {
        let denied = |reason: &str| StorageError::AccessDenied(reason.to_string());

        let url = url::Url::parse(raw_url).map_err(|_| denied("Malformed URL"))?;
        if url.scheme() != URL_SCHEME || url.host_str() != Some(self.bucket.as_str()) {
            return Err(denied("URL does not belong to this bucket"));
        }

        let key = urlencoding::decode(url.path().trim_start_matches('/'))
            .map_err(|_| denied("Malformed key"))?
            .into_owned();

        let mut amz_date = None;
        let mut expires = None;
        let mut signature = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "X-Amz-Date" => amz_date = Some(value.into_owned()),
                "X-Amz-Expires" => expires = Some(value.into_owned()),
                "X-Amz-Signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }

        let (Some(amz_date), Some(expires), Some(signature)) = (amz_date, expires, signature)
        else {
            return Err(denied("Missing signature parameters"));
        };

        let expires_secs: u64 = expires.parse().map_err(|_| denied("Malformed expiry"))?;
        let signed_at = NaiveDateTime::parse_from_str(&amz_date, AMZ_DATE_FORMAT)
            .map_err(|_| denied("Malformed date"))?
            .and_utc();
        let signature = hex::decode(signature).map_err(|_| denied("Malformed signature"))?;

        self.signature(&key, &amz_date, expires_secs)?
            .verify_slice(&signature)
            .map_err(|_| denied("Signature does not match"))?;

        let ttl = i64::try_from(expires_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| denied("Malformed expiry"))?;

        Ok(VerifiedRequest {
            key,
            expires_at: signed_at + ttl,
        })
    }
}

struct VerifiedRequest {
    key: String,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes) -> StorageResult<()> {
        validate_storage_key(storage_key)?;

        let size = data.len();
        self.objects.write().await.insert(
            storage_key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            "Stored object in memory"
        );

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        validate_storage_key(storage_key)?;

        let ttl = chrono::Duration::from_std(expires_in)
            .map_err(|e| StorageError::SigningFailed(format!("invalid expiry: {}", e)))?;
        let signed_at = Utc::now().trunc_subsecs(0);
        let amz_date = signed_at.format(AMZ_DATE_FORMAT).to_string();
        let expires_secs = expires_in.as_secs();

        let signature = hex::encode(
            self.signature(storage_key, &amz_date, expires_secs)?
                .finalize()
                .into_bytes(),
        );

        let url = format!(
            "{}://{}/{}?X-Amz-Date={}&X-Amz-Expires={}&X-Amz-Signature={}",
            URL_SCHEME,
            self.bucket,
            urlencoding::encode(storage_key),
            amz_date,
            expires_secs,
            signature
        );

        Ok(PresignedUrl::new(url, signed_at + ttl))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
