//! Storage setup and initialization

use anyhow::Result;
use parcel_core::Config;
use parcel_storage::{create_storage, Storage};
use std::sync::Arc;

/// Build the configured storage backend.
pub fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage backend...");
    let storage = create_storage(config)?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        endpoint = ?config.s3_endpoint(),
        "Storage backend initialized successfully"
    );
    Ok(storage)
}
