//! Download API integration tests.
//!
//! Run with: `cargo test -p parcel-api --test download_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use chrono::{Duration, NaiveDateTime, Utc};
use helpers::setup_test_app;
use parcel_storage::StorageError;
use serde_json::Value;
use url::Url;

fn query_value(url: &Url, name: &str) -> String {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| panic!("missing {name} in {url}"))
}

/// Expiry encoded in a presigned URL: X-Amz-Date + X-Amz-Expires.
fn encoded_expiry(url: &Url) -> chrono::DateTime<Utc> {
    let signed_at =
        NaiveDateTime::parse_from_str(&query_value(url, "X-Amz-Date"), "%Y%m%dT%H%M%SZ")
            .unwrap()
            .and_utc();
    let expires: i64 = query_value(url, "X-Amz-Expires").parse().unwrap();
    signed_at + Duration::seconds(expires)
}

#[tokio::test]
async fn test_download_redirects_to_presigned_url() {
    let app = setup_test_app();

    let before = Utc::now();
    let response = app
        .client()
        .get("/storage/download/abc_report.pdf")
        .add_query_param("expires_in", 3600)
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.header("cache-control"), "no-store");

    let location = response.header("location");
    let url = Url::parse(location.to_str().unwrap()).unwrap();
    assert_eq!(url.host_str(), Some("uploads"));
    assert_eq!(url.path(), "/abc_report.pdf");
    assert_eq!(query_value(&url, "X-Amz-Expires"), "3600");

    let drift = (encoded_expiry(&url) - (before + Duration::minutes(60)))
        .num_milliseconds()
        .abs();
    assert!(drift <= 1000, "expiry drift {drift}ms");
}

#[tokio::test]
async fn test_download_uses_default_ttl() {
    let app = setup_test_app();

    let response = app.client().get("/storage/download/abc_report.pdf").await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    let url = Url::parse(response.header("location").to_str().unwrap()).unwrap();
    assert_eq!(query_value(&url, "X-Amz-Expires"), "3600");
}

#[tokio::test]
async fn test_expiry_tracks_requested_duration() {
    let app = setup_test_app();

    for minutes in [1i64, 5, 60] {
        let before = Utc::now();
        let response = app
            .client()
            .get("/storage/download/abc_report.pdf")
            .add_query_param("expires_in", minutes * 60)
            .await;
        assert_eq!(response.status_code(), StatusCode::FOUND);

        let url = Url::parse(response.header("location").to_str().unwrap()).unwrap();
        let drift = (encoded_expiry(&url) - (before + Duration::minutes(minutes)))
            .num_milliseconds()
            .abs();
        assert!(drift <= 1000, "expiry drift {drift}ms for {minutes} minutes");
    }
}

#[tokio::test]
async fn test_uploaded_file_is_fetchable_until_expiry() {
    let app = setup_test_app();
    let client = app.client();

    let upload = client
        .post("/storage/upload")
        .multipart(
            MultipartForm::new().add_part(
                "file",
                Part::bytes(bytes::Bytes::from_static(b"quarterly numbers"))
                    .file_name("report.pdf")
                    .mime_type("application/pdf"),
            ),
        )
        .await;
    assert_eq!(upload.status_code(), StatusCode::CREATED);
    let key = upload.json::<Value>()["key"].as_str().unwrap().to_string();

    let response = client
        .get(&format!("/storage/download/{}", key))
        .add_query_param("expires_in", 60)
        .await;
    assert_eq!(response.status_code(), StatusCode::FOUND);
    let location = response.header("location").to_str().unwrap().to_string();
    let url = Url::parse(&location).unwrap();
    let expires_at = encoded_expiry(&url);

    let object = app
        .storage
        .fetch_presigned_at(&location, expires_at - Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(object.data.as_ref(), b"quarterly numbers");
    assert_eq!(object.content_type, "application/pdf");

    let expired = app
        .storage
        .fetch_presigned_at(&location, expires_at + Duration::seconds(1))
        .await
        .unwrap_err();
    assert!(matches!(expired, StorageError::AccessDenied(_)));
}

#[tokio::test]
async fn test_download_of_missing_key_still_redirects() {
    let app = setup_test_app();

    let response = app
        .client()
        .get("/storage/download/never-uploaded.txt")
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    let location = response.header("location").to_str().unwrap().to_string();
    assert!(matches!(
        app.storage.fetch_presigned(&location).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_download_key_with_slash_routes() {
    let app = setup_test_app();

    let response = app
        .client()
        .get("/storage/download/abc_nested/report.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    let url = Url::parse(response.header("location").to_str().unwrap()).unwrap();
    assert_eq!(url.path(), "/abc_nested%2Freport.pdf");
}

#[tokio::test]
async fn test_download_rejects_out_of_range_expiry() {
    let app = setup_test_app();

    for expires_in in ["0", "604801", "abc", "-5"] {
        let response = app
            .client()
            .get("/storage/download/abc_report.pdf")
            .add_query_param("expires_in", expires_in)
            .await;

        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "expires_in={expires_in}"
        );
        assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    }

    let response = app
        .client()
        .get("/storage/download/abc_report.pdf")
        .add_query_param("expires_in", 604800)
        .await;
    assert_eq!(response.status_code(), StatusCode::FOUND);
}
