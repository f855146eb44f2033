//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use parcel_core::constants::DEFAULT_MAX_FILE_SIZE_BYTES;
use parcel_core::Config;

/// Validate critical configuration values
///
/// Runs the configuration's own checks, then warns about settings that are
/// legal but likely unintended.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if config.max_file_size_bytes() > DEFAULT_MAX_FILE_SIZE_BYTES * 10 {
        tracing::warn!(
            max_file_size_bytes = config.max_file_size_bytes(),
            "Upload limit is very high - uploads are buffered in memory before being stored"
        );
    }

    if let Some(endpoint) = config.s3_endpoint() {
        if is_production && endpoint.starts_with("http://") {
            tracing::warn!(
                endpoint = %endpoint,
                "S3 endpoint uses plain HTTP in production - presigned URLs will not be encrypted in transit"
            );
        }
    }

    Ok(())
}
