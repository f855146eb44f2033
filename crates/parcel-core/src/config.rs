//! Configuration module
//!
//! Configuration is read once from the environment (optionally seeded by a
//! `.env` file), validated, and then shared immutably for the life of the
//! process. Nothing reads environment variables after startup.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_DOWNLOAD_URL_TTL_SECS, MAX_PRESIGNED_URL_TTL_SECS,
};
use crate::policy::{PolicyConfigError, UploadPolicy};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_FILE_SIZE_MB: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub log_format: String,
}

/// Upload gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub memory_signing_secret: Option<String>,
    // Upload policy
    pub max_file_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    // Download URLs
    pub download_url_ttl_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GatewayConfig>);

impl Config {
    fn as_gateway(&self) -> &GatewayConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.as_gateway().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GatewayConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_gateway().validate()
    }

    /// Build the upload policy described by this configuration.
    pub fn upload_policy(&self) -> Result<UploadPolicy, PolicyConfigError> {
        UploadPolicy::new(
            self.as_gateway().max_file_size_bytes,
            &self.as_gateway().allowed_content_types,
        )
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_gateway().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_gateway().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_gateway().base.environment
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.as_gateway().base.request_timeout_secs)
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_gateway().base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.as_gateway().base.log_format
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_gateway().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_gateway().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_gateway().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_gateway().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_gateway().aws_region.as_deref()
    }

    pub fn aws_access_key_id(&self) -> Option<&str> {
        self.as_gateway().aws_access_key_id.as_deref()
    }

    pub fn aws_secret_access_key(&self) -> Option<&str> {
        self.as_gateway().aws_secret_access_key.as_deref()
    }

    pub fn memory_signing_secret(&self) -> Option<&str> {
        self.as_gateway().memory_signing_secret.as_deref()
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.as_gateway().max_file_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_gateway().allowed_content_types
    }

    pub fn download_url_ttl(&self) -> Duration {
        Duration::from_secs(self.as_gateway().download_url_ttl_secs)
    }
}

fn is_production_environment(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_bytes = parse_max_file_size_bytes(
            &env::var("MAX_FILE_SIZE_MB").unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string()),
        )?;

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.join(","))
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(value.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let config = GatewayConfig {
            base,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok().filter(|s| !s.is_empty()),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            memory_signing_secret: env::var("MEMORY_SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            max_file_size_bytes,
            allowed_content_types,
            download_url_ttl_secs: env::var("DOWNLOAD_URL_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_DOWNLOAD_URL_TTL_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DOWNLOAD_URL_TTL_SECS must be a valid number"))?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if is_production_environment(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT cannot be 0"));
        }

        UploadPolicy::new(self.max_file_size_bytes, &self.allowed_content_types)
            .map_err(|e| anyhow::anyhow!("Invalid upload policy: {}", e))?;

        if self.download_url_ttl_secs == 0 || self.download_url_ttl_secs > MAX_PRESIGNED_URL_TTL_SECS
        {
            return Err(anyhow::anyhow!(
                "DOWNLOAD_URL_TTL_SECS must be between 1 and {}",
                MAX_PRESIGNED_URL_TTL_SECS
            ));
        }

        // Validate storage backend configuration
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
                if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
                    return Err(anyhow::anyhow!(
                        "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"
                    ));
                }
            }
            StorageBackend::Memory => {
                if is_production_environment(&self.base.environment) {
                    return Err(anyhow::anyhow!(
                        "The memory storage backend cannot be used in production"
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Convert a `MAX_FILE_SIZE_MB` value to bytes.
fn parse_max_file_size_bytes(value: &str) -> anyhow::Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number"))?
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large"))
}
