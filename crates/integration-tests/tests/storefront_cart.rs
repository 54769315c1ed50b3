//! Cart fragments against a running storefront.
//!
//! These tests require:
//! - The storefront running with a reachable commerce API
//! - `HARBOR_TEST_VARIANT_ID` naming an in-stock variant
//!
//! Run with: cargo test -p harbor-integration-tests -- --ignored

use harbor_integration_tests::{fixture, session_client, storefront_url};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_health_endpoints() {
    let client = session_client();
    let base_url = storefront_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_add_to_cart_updates_badge() {
    let client = session_client();
    let base_url = storefront_url();
    let variant_id = fixture("HARBOR_TEST_VARIANT_ID");

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("variant_id", variant_id.as_str()), ("quantity", "2")])
        .send()
        .await
        .expect("Failed to add to cart");

    assert_eq!(resp.status(), StatusCode::OK);
    let trigger: Value = serde_json::from_str(
        resp.headers()
            .get("hx-trigger")
            .and_then(|v| v.to_str().ok())
            .expect("Missing HX-Trigger header"),
    )
    .expect("HX-Trigger is not JSON");
    assert!(trigger.get("cart-updated").is_some());
    assert_eq!(trigger["toast"]["level"], "success");

    let badge = resp.text().await.expect("Failed to read badge");
    assert_eq!(badge.trim(), "2");

    // Same session sees the same cart
    let resp = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count");
    assert_eq!(resp.text().await.expect("Failed to read badge").trim(), "2");
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_cart_page_lists_added_item() {
    let client = session_client();
    let base_url = storefront_url();
    let variant_id = fixture("HARBOR_TEST_VARIANT_ID");

    client
        .post(format!("{base_url}/cart/add"))
        .form(&[("variant_id", variant_id.as_str())])
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read cart page");
    assert!(body.contains("id=\"cart-items\""));
    assert!(body.contains("/checkout"));
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_empty_cart_checkout_redirects_to_cart() {
    let client = session_client();
    let base_url = storefront_url();

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");

    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/cart")
    );
}
