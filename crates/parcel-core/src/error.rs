//! Error types module
//!
//! All gateway failures are unified under the `AppError` enum. Each variant
//! describes its own HTTP presentation through [`ErrorMetadata`], so the core
//! stays independent of any web framework while callers can still map a
//! failure one-to-one onto a status code.

use std::io;

use crate::policy::{PolicyConfigError, PolicyError};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like an unreachable store
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PAYLOAD_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File too large: {size} bytes exceeds max {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Unsupported media type: {}", .content_type.as_deref().unwrap_or("<none>"))]
    UnsupportedMediaType {
        content_type: Option<String>,
        allowed: Vec<String>,
    },

    #[error("Signing failure: {0}")]
    SigningFailure(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<PolicyError> for AppError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::PayloadTooLarge { size, max } => AppError::PayloadTooLarge { size, max },
            PolicyError::UnsupportedMediaType {
                content_type,
                allowed,
            } => AppError::UnsupportedMediaType {
                content_type,
                allowed,
            },
        }
    }
}

impl From<PolicyConfigError> for AppError {
    fn from(err: PolicyConfigError) -> Self {
        AppError::Internal(format!("Invalid upload policy: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size below the configured limit"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType { .. } => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload one of the allowed content types"),
            false,
            LogLevel::Debug,
        ),
        AppError::SigningFailure(_) => (
            500,
            "SIGNING_FAILURE",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::StoreUnavailable(_) => (
            502,
            "STORE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Warn,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the storage key exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::UnsupportedMediaType { .. } => "UnsupportedMediaType",
            AppError::SigningFailure(_) => "SigningFailure",
            AppError::StoreUnavailable(_) => "StoreUnavailable",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::PayloadTooLarge { max, .. } => format!(
                "File size exceeds maximum allowed size of {} bytes ({} MB)",
                max,
                max / 1024 / 1024
            ),
            AppError::UnsupportedMediaType {
                content_type,
                allowed,
            } => format!(
                "Unsupported file type: {}. Allowed types: {}",
                content_type.as_deref().unwrap_or("none"),
                allowed.join(", ")
            ),
            AppError::SigningFailure(_) => "Failed to generate download URL".to_string(),
            AppError::StoreUnavailable(_) => "Object store unavailable".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
