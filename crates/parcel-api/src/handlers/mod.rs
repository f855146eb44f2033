pub mod download;
pub mod upload;
