mod common;

use common::TestApp;
use convert_service::services::init_metrics;
use reqwest::Client;

#[tokio::test]
async fn health_check_returns_liveness_payload() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    for path in ["/health/", "/health", "/api/health/"] {
        let response = client
            .get(format!("{}{}", app.address, path))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status().as_u16(), 200, "{}", path);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(
            body,
            serde_json::json!({"status": "success", "message": "Service is running"})
        );
    }
}

#[tokio::test]
async fn health_check_ignores_storage_state() {
    let app = TestApp::spawn().await;

    // Media root does not exist until the first conversion.
    assert!(!app.media_root.exists());

    let response = Client::new()
        .get(format!("{}/health/", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    // A failed conversion does not change the answer either.
    let failed = app.upload("notes.txt", b"plain text").await;
    assert_eq!(failed.status().as_u16(), 400);

    let response = Client::new()
        .get(format!("{}/health/", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .get(format!("{}/health/", app.address))
        .header("x-request-id", "req-42")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    init_metrics();
    let app = TestApp::spawn().await;
    let client = Client::new();

    // Generate at least one recorded request.
    client
        .get(format!("{}/health/", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type");
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.expect("Failed to get response body");
    assert!(
        body.is_empty() || body.contains('#') || body.contains('_'),
        "Unexpected metrics format: {}",
        body
    );
}
