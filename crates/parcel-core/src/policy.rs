//! Upload policy and storage key generation.
//!
//! Every upload passes two checks, always in this order:
//!
//! 1. size: rejected when larger than `max_size_bytes`
//! 2. content type: rejected when absent or not in the allow-list
//!
//! Only when both pass is a [`StorageKey`] derived. The policy never touches
//! storage; the caller issues the PUT with the returned key.

use std::collections::BTreeSet;

use crate::constants::{DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_MAX_FILE_SIZE_BYTES};
use crate::models::StorageKey;

/// Rejections produced by [`UploadPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Unsupported content type: {} (allowed: {allowed:?})", .content_type.as_deref().unwrap_or("<none>"))]
    UnsupportedMediaType {
        content_type: Option<String>,
        allowed: Vec<String>,
    },
}

/// Errors raised while constructing an [`UploadPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyConfigError {
    #[error("Maximum upload size must be greater than zero")]
    ZeroSizeLimit,

    #[error("At least one allowed content type is required")]
    EmptyAllowList,
}

/// Size and content-type limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_size_bytes: u64,
    allowed_content_types: BTreeSet<String>,
}

impl UploadPolicy {
    pub fn new<I, S>(max_size_bytes: u64, allowed_content_types: I) -> Result<Self, PolicyConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if max_size_bytes == 0 {
            return Err(PolicyConfigError::ZeroSizeLimit);
        }

        let allowed_content_types: BTreeSet<String> = allowed_content_types
            .into_iter()
            .map(|ct| ct.as_ref().to_string())
            .filter(|ct| !ct.trim().is_empty())
            .collect();

        if allowed_content_types.is_empty() {
            return Err(PolicyConfigError::EmptyAllowList);
        }

        Ok(Self {
            max_size_bytes,
            allowed_content_types,
        })
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn allowed_content_types(&self) -> impl Iterator<Item = &str> {
        self.allowed_content_types.iter().map(String::as_str)
    }

    /// Reject uploads larger than the configured limit. A file of exactly
    /// `max_size_bytes` is accepted.
    pub fn validate_size(&self, size: u64) -> Result<(), PolicyError> {
        if size > self.max_size_bytes {
            return Err(PolicyError::PayloadTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Reject a missing content type or one outside the allow-list.
    ///
    /// The declared value must equal an allowed entry exactly: parameters,
    /// surrounding whitespace and case all count.
    pub fn validate_content_type(&self, content_type: Option<&str>) -> Result<(), PolicyError> {
        let allowed =
            content_type.is_some_and(|ct| self.allowed_content_types.contains(ct));

        if !allowed {
            return Err(PolicyError::UnsupportedMediaType {
                content_type: content_type.map(str::to_string),
                allowed: self.allowed_content_types.iter().cloned().collect(),
            });
        }
        Ok(())
    }

    /// Validate an upload and derive its storage key.
    ///
    /// Size is checked before content type; a key is only generated when both
    /// checks pass.
    pub fn validate_and_key(
        &self,
        size: u64,
        content_type: Option<&str>,
        filename: &str,
    ) -> Result<StorageKey, PolicyError> {
        self.validate_size(size)?;
        self.validate_content_type(content_type)?;
        Ok(StorageKey::generate(filename))
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|ct| ct.to_string())
                .collect(),
        }
    }
}
