//! Shared constants and defaults.

/// Default upload size limit: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted when `ALLOWED_CONTENT_TYPES` is not set.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] =
    &["image/png", "image/jpeg", "application/pdf", "text/plain"];

/// Default validity of an issued download URL (60 minutes).
pub const DEFAULT_DOWNLOAD_URL_TTL_SECS: u64 = 60 * 60;

/// Longest validity a SigV4 presigned URL may carry (7 days).
pub const MAX_PRESIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Filename used when a multipart file part carries none.
pub const UNKNOWN_FILENAME: &str = "unknown";
