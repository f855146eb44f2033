use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Storage key of the stored object: `<uuid>_<filename>`
    pub key: String,
}

#[utoipa::path(
    post,
    path = "/storage/upload",
    tag = "storage",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "A single part named `file`"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing or duplicate file field", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse),
        (status = 502, description = "Object store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let request = extract_multipart_file(multipart, state.max_file_size_bytes()).await?;
    let key = state.uploads.upload(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            key: key.into_string(),
        }),
    ))
}
