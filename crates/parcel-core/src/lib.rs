//! Parcel Core Library
//!
//! This crate provides the domain types shared by every Parcel component: the
//! upload policy and storage key generator, error types, and configuration.
//! It performs no I/O; storage backends live in `parcel-storage` and the HTTP
//! surface in `parcel-api`.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod policy;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GatewayConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{PresignedUrl, StorageKey};
pub use policy::{PolicyConfigError, PolicyError, UploadPolicy};
pub use storage_types::StorageBackend;
