use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::IntoParams;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// URL validity in seconds (default: configured TTL, max 7 days)
    #[validate(range(min = 1, max = 604800))]
    pub expires_in: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/storage/download/{key}",
    tag = "storage",
    params(
        ("key" = String, Path, description = "Storage key returned by the upload endpoint"),
        DownloadQuery
    ),
    responses(
        (status = 302, description = "Redirect to a presigned GET URL"),
        (status = 400, description = "Invalid key or expiry", body = ErrorResponse),
        (status = 500, description = "Signing failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "download_file"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    query.validate().map_err(parcel_core::AppError::from)?;

    let presigned = match query.expires_in {
        Some(secs) => {
            state
                .downloads
                .issue(&key, Duration::from_secs(secs))
                .await?
        }
        None => state.downloads.issue_default(&key).await?,
    };

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, presigned.url),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    ))
}
