//! Health endpoint integration test.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_reports_service_and_timestamp() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Nimbus Hosting");
    assert!(body["timestamp"].as_str().is_some());
}
