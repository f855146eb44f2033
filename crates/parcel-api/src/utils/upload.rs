//! Multipart extraction for the upload handler

use axum::extract::Multipart;
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;
use parcel_core::constants::UNKNOWN_FILENAME;
use parcel_core::AppError;

use crate::error::multipart_error;
use crate::services::UploadRequest;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Extract file data, filename, and content type from multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
/// Other fields are ignored.
///
/// A part without a filename is stored as `unknown`. A part without a content
/// type keeps it absent so the policy can reject it. The content type is the
/// part header as sent, not the lower-cased form the multipart parser keeps.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    max_size_bytes: u64,
) -> Result<UploadRequest, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if file_data.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }
        filename = field.file_name().map(str::to_string);
        content_type = field
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_size_bytes))?;

        file_data = Some(data);
    }

    let data = file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(UploadRequest {
        filename: filename
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_FILENAME.to_string()),
        content_type,
        data,
    })
}
