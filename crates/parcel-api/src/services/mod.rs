//! Gateway services: the upload pipeline and the download URL issuer.

pub mod download;
#[cfg(test)]
pub(crate) mod mock_storage;
pub mod upload;

pub use download::DownloadUrlIssuer;
pub use upload::{UploadRequest, UploadService};
