//! Application state shared by every handler.

use std::sync::Arc;

use parcel_core::Config;
use parcel_storage::Storage;

use crate::services::{DownloadUrlIssuer, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub uploads: UploadService,
    pub downloads: DownloadUrlIssuer,
}

impl AppState {
    /// Build the state from validated configuration and a storage backend.
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Result<Self, anyhow::Error> {
        let policy = config
            .upload_policy()
            .map_err(|e| anyhow::anyhow!("Invalid upload policy: {}", e))?;
        let uploads = UploadService::new(policy, storage.clone());
        let downloads = DownloadUrlIssuer::new(storage.clone(), config.download_url_ttl());

        Ok(Self {
            config,
            storage,
            uploads,
            downloads,
        })
    }

    /// Upload size limit, in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.uploads.policy().max_size_bytes()
    }
}
