mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

use pasted_daemon::http_server::router;
use pasted_daemon::ServiceState;

async fn get(state: ServiceState, uri: &str) -> Response {
    router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_get_returns_original_text() {
    let state = common::state(&["aes", "gzip", "base64"]);
    let key = common::store_paste(&state, b"hello world").await;

    let response = get(state, &format!("/{}", key)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, b"hello world");
}

#[tokio::test]
async fn test_get_binary_payload() {
    let state = common::state(&["gzip"]);
    let payload: Vec<u8> = (0..=255u8).rev().collect();
    let key = common::store_paste(&state, &payload).await;

    let response = get(state, &format!("/{}", key)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
    assert_eq!(body_bytes(response).await, payload);
}

#[tokio::test]
async fn test_missing_key_is_404() {
    let response = get(common::state(&["aes"]), "/doesnotexist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"not found");
}

#[tokio::test]
async fn test_missing_key_json_404() {
    let request = Request::builder()
        .uri("/doesnotexist")
        .header(ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let response = router(common::state(&[]))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["msg"], "not found");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = get(common::state(&[]), "/a/b/c").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_undecodable_blob_is_500() {
    let backend = common::memory_backend();

    // stored without any transforms, read back expecting base64
    let writer = common::state_with(&[], backend.clone(), 1024);
    let key = common::store_paste(&writer, b"!!! not base64 !!!").await;
    let reader = common::state_with(&["base64"], backend, 1024);

    let response = get(reader, &format!("/{}", key)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"Error retrieving paste");
}

#[tokio::test]
async fn test_backend_failure_is_500() {
    let state = common::state_with(&[], Arc::new(common::DownBackend), 1024);
    let response = get(state, "/abc123").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_status_endpoints() {
    let response = get(common::state(&[]), "/_status/livez").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(common::state(&[]), "/_status/readyz").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(common::state(&[]), "/_status/version").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_readyz_reports_down_backend() {
    let state = common::state_with(&[], Arc::new(common::DownBackend), 1024);
    let response = get(state, "/_status/readyz").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "failure");
}
