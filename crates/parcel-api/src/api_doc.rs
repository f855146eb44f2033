//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parcel API",
        version = "0.1.0",
        description = "Upload gateway: validated uploads to an S3-compatible object store and presigned download redirects."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::download::download_file,
        health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::upload::UploadResponse,
        health::HealthCheckResponse,
    )),
    tags(
        (name = "storage", description = "Upload files and obtain download URLs"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_gateway_routes() {
        let spec = get_openapi_spec();
        let paths: Vec<&str> = spec.paths.paths.keys().map(String::as_str).collect();
        assert!(paths.contains(&"/storage/upload"));
        assert!(paths.contains(&"/storage/download/{key}"));
        assert!(paths.contains(&"/health"));
    }
}
