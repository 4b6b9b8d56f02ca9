//! Tests for health check endpoints.
//!
//! Component state lives in a process-wide registry, so these tests only
//! assert on transitions they cause themselves.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;
use store::StoreConnector;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    for field in ["status", "submission_store_connected", "ad_catalog_connected", "metrics"] {
        assert!(body.get(field).is_some(), "Response should have '{}' field", field);
    }

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
}

/// Test /health/live always answers
#[tokio::test]
async fn test_liveness() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/live").await.assert_status_ok();
}

/// Probing the stores drives readiness both ways.
///
/// One test so the two transitions never race on the shared registry.
#[tokio::test]
async fn test_probe_updates_readiness() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let connector: &dyn StoreConnector = &ctx.connector;
    assert!(store::health::check_connection(connector).await);

    server.get("/health/ready").await.assert_status_ok();

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["submission_store_connected"], true);
    assert_eq!(body["ad_catalog_connected"], true);
    assert_eq!(body["status"], "healthy");

    ctx.connector.set_submission_store_down(true);
    assert!(!store::health::check_connection(connector).await);

    let response = server.get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["submission_store_connected"], false);
    assert_ne!(body["status"], "healthy");
}
