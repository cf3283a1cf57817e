// SPDX-License-Identifier: MIT

//! Input validation for the analysis endpoint and related public routes.
//!
//! These run against the offline mock DB, so they cover everything that
//! must be rejected before any store or provider call.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a multipart body from (name, filename, content-type, value) parts.
fn multipart_body(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content_type, value) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_analyze_requires_multipart() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_without_uid() {
    let (app, _) = common::create_test_app();

    let body = multipart_body(&[(
        "file",
        Some("a.jpg"),
        Some("image/jpeg"),
        b"\xFF\xD8\xFF\xE0fake",
    )]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_without_file() {
    let (app, _) = common::create_test_app();

    let body = multipart_body(&[("uid", None, None, b"user-123")]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_with_offline_store_is_500() {
    let (app, _) = common::create_test_app();

    // Valid form; the user lookup fails because the mock DB is offline
    let body = multipart_body(&[
        ("uid", None, None, b"user-123"),
        (
            "file",
            Some("a.jpg"),
            Some("image/jpeg"),
            b"\xFF\xD8\xFF\xE0fake",
        ),
    ]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_analyze_oversized_body_rejected() {
    let mut config = stockmeta::config::Config::test_default();
    config.max_upload_bytes = 16;
    let (app, _) = common::create_test_app_with(config);

    // Far beyond the batch body ceiling derived from the per-file limit
    let payload = vec![0u8; 2 * 1024 * 1024];
    let body = multipart_body(&[("file", Some("a.jpg"), Some("image/jpeg"), &payload)]);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_formats_reports_disabled_toggles() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/formats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["svg_enabled"], false);
    assert_eq!(value["eps_enabled"], false);
    let accepted = value["accepted"].as_array().unwrap();
    assert!(accepted.iter().any(|v| v == "image/jpeg"));
    assert!(!accepted.iter().any(|v| v == "image/svg+xml"));
}

#[tokio::test]
async fn test_get_user_requires_uid() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
