//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p parcel-api`. Uses the in-memory
//! storage backend, so no object store is needed.

#![allow(dead_code)]

pub mod multipart;

use axum_test::TestServer;
use parcel_api::setup::routes;
use parcel_api::state::AppState;
use parcel_core::constants::DEFAULT_ALLOWED_CONTENT_TYPES;
use parcel_core::{BaseConfig, Config, GatewayConfig, StorageBackend};
use parcel_storage::InMemoryStorage;
use std::sync::Arc;

pub const MIB: usize = 1024 * 1024;
pub const TEST_BUCKET: &str = "uploads";

/// Test application: server plus direct access to the backing store.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<InMemoryStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            request_timeout_secs: 30,
            http_concurrency_limit: 64,
            log_format: "compact".to_string(),
        },
        storage_backend: Some(StorageBackend::Memory),
        s3_bucket: Some(TEST_BUCKET.to_string()),
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        memory_signing_secret: Some("integration-test-secret".to_string()),
        max_file_size_bytes: (10 * MIB) as u64,
        allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
            .iter()
            .map(|s| s.to_string())
            .collect(),
        download_url_ttl_secs: 3600,
    }
}

/// Setup test app with default policy and in-memory storage.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: GatewayConfig) -> TestApp {
    let config = Config(Box::new(config));
    config.validate().expect("test config must be valid");

    let storage = Arc::new(InMemoryStorage::new(
        TEST_BUCKET,
        config.memory_signing_secret(),
    ));
    let state = Arc::new(
        AppState::new(config.clone(), storage.clone()).expect("Failed to build app state"),
    );
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, storage }
}
