//! Parcel Storage Library
//!
//! This crate provides the object store capability used by the gateway: the
//! [`Storage`] trait and its backends.
//!
//! - `S3Storage`: any S3-compatible endpoint (AWS, MinIO) through `object_store`,
//!   path-style addressing, SigV4 presigned GET URLs.
//! - `InMemoryStorage`: process-local store for development and tests. Its
//!   presigned URLs are HMAC-signed and can be redeemed against the same
//!   instance.
//!
//! # Storage key format
//!
//! Keys are produced by `parcel_core::UploadPolicy` as `<uuid>_<filename>` and
//! are passed through unchanged. The only requirement enforced here is that a
//! key is non-empty.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-memory")]
pub use memory::InMemoryStorage;
pub use parcel_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Credentials, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
