//! Tier catalog integration tests.

mod common;

use common::TestHarness;
use nimbus_store::Store;

#[tokio::test]
async fn list_returns_seeded_tiers_cheapest_first() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/api/configs").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Kitten", "Cat", "Lion"]);

    let lion = &body["data"][2];
    assert_eq!(lion["price_monthly"], 200_000);
    assert_eq!(lion["bandwidth_gb"], 0);
    assert!(lion["features"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn deactivated_tier_disappears_from_listing_but_stays_addressable() {
    let harness = TestHarness::new().await;
    let cat_id = harness.config_id("Cat").await;

    harness
        .state
        .store
        .set_config_active(cat_id, false)
        .await
        .unwrap();

    let response = harness.server.get("/api/configs").await;
    let body: serde_json::Value = response.json();
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Kitten", "Lion"]);

    // Direct lookup still works so existing purchases can render their tier.
    let response = harness.server.get(&format!("/api/configs/{cat_id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["is_active"], false);
}

#[tokio::test]
async fn unknown_tier_is_not_found() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/api/configs/9999").await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}
