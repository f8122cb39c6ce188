//! Metadata upload integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Harness allowed to fetch from the local mock server.
fn local_fetch_harness() -> TestHarness {
    TestHarness::with_uploader_and_config(|config| config.allow_private_image_hosts = true)
}

#[tokio::test]
async fn create_uri_uploads_image_then_metadata() {
    let harness = TestHarness::with_uploader();

    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": "data:image/png;base64,AQID",
            "metadata": {
                "name": "Coffee #1",
                "description": "One free coffee",
                "attributes": [{ "trait_type": "shop", "value": "Bean" }]
            }
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["imageUrl"], "https://gateway.test/0");
    assert_eq!(body["imageType"], "image/png");
    assert_eq!(body["metadataUri"], "https://gateway.test/1");
    assert_eq!(body["metadata"]["image"], "https://gateway.test/0");
    assert_eq!(body["metadata"]["external_url"], "https://dealifi.com");
    assert_eq!(body["metadata"]["attributes"][1]["trait_type"], "redeemed");

    let uploader = harness.uploader.as_ref().unwrap();
    let uploads = uploader.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0], ("image/png".to_string(), vec![1, 2, 3]));
    assert_eq!(uploads[1].0, "application/json");

    let document: serde_json::Value = serde_json::from_slice(&uploads[1].1).unwrap();
    assert_eq!(document["name"], "Coffee #1");
    assert_eq!(document["properties"]["category"], "image");
}

#[tokio::test]
async fn create_uri_without_uploader_returns_502() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": "data:image/png;base64,AQID",
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn create_uri_rejects_unsupported_image_source() {
    let harness = TestHarness::with_uploader();

    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": "ftp://example.com/a.png",
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(harness.uploader.as_ref().unwrap().uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_uri_missing_metadata_returns_400() {
    let harness = TestHarness::with_uploader();

    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({ "imageData": "data:image/png;base64,AQID" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_uri_fetches_remote_image() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deal.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![9u8, 8, 7], "image/jpeg"))
        .expect(1)
        .mount(&upstream)
        .await;

    let harness = local_fetch_harness();
    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": format!("{}/deal.jpg", upstream.uri()),
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["imageType"], "image/jpeg");
    assert_eq!(body["metadata"]["properties"]["files"][0]["type"], "image/jpeg");

    let uploads = harness.uploader.as_ref().unwrap().uploads.lock().unwrap();
    assert_eq!(uploads[0], ("image/jpeg".to_string(), vec![9, 8, 7]));
}

#[tokio::test]
async fn create_uri_upstream_404_returns_502() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;

    let harness = local_fetch_harness();
    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": format!("{}/missing.png", upstream.uri()),
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(harness.uploader.as_ref().unwrap().uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_uri_rejects_oversized_image() {
    let upstream = MockServer::start().await;
    let too_big = vec![0u8; 3 * 1024 * 1024];
    Mock::given(method("GET"))
        .and(path("/huge.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(too_big, "image/png"))
        .mount(&upstream)
        .await;

    let harness = local_fetch_harness();
    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": format!("{}/huge.png", upstream.uri()),
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "payload_too_large");
    assert!(harness.uploader.as_ref().unwrap().uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_uri_rejects_non_image_content() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&upstream)
        .await;

    let harness = local_fetch_harness();
    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": format!("{}/page", upstream.uri()),
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(harness.uploader.as_ref().unwrap().uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_uri_refuses_loopback_host_by_default() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8], "image/png"))
        .expect(0)
        .mount(&upstream)
        .await;

    let harness = TestHarness::with_uploader();
    let response = harness
        .server
        .post("/api/create-uri")
        .json(&json!({
            "imageData": format!("{}/a.png", upstream.uri()),
            "metadata": { "name": "Coffee #1" }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
