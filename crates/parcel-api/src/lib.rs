//! Parcel API Library
//!
//! This crate provides the HTTP handlers, middleware, and application setup
//! for the upload gateway.

// Module declarations
mod api_doc;
mod handlers;
mod middleware;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::{DownloadUrlIssuer, UploadRequest, UploadService};
pub use state::AppState;
