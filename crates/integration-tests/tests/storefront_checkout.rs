//! Guest checkout against a running storefront.
//!
//! These tests require:
//! - The storefront running with a reachable commerce API
//! - `HARBOR_TEST_VARIANT_ID` naming an in-stock variant
//! - `HARBOR_TEST_PROVINCE`, `HARBOR_TEST_DISTRICT`, `HARBOR_TEST_WARD`
//!   naming a location the API ships to
//!
//! Run with: cargo test -p harbor-integration-tests -- --ignored

use harbor_integration_tests::{field_edit, fixture, session_client, storefront_url};
use reqwest::{Client, StatusCode};

/// Put one item in a fresh session's cart and open checkout.
async fn start_checkout(client: &Client, base_url: &str) {
    let variant_id = fixture("HARBOR_TEST_VARIANT_ID");
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("variant_id", variant_id.as_str())])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to open checkout");
    assert_eq!(resp.status(), StatusCode::OK);
}

async fn edit(client: &Client, base_url: &str, field: &str, value: &str) -> String {
    let resp = client
        .post(format!("{base_url}/checkout/field"))
        .form(&field_edit(field, value))
        .send()
        .await
        .expect("Failed to edit checkout field");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.text().await.expect("Failed to read checkout fragment")
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_invalid_email_is_reported_without_swap() {
    let client = session_client();
    let base_url = storefront_url();
    start_checkout(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/checkout/field"))
        .form(&field_edit("email", "not-an-email"))
        .send()
        .await
        .expect("Failed to edit checkout field");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("hx-reswap")
            .and_then(|v| v.to_str().ok()),
        Some("none")
    );
    assert!(resp.headers().contains_key("hx-trigger"));
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_complete_location_offers_shipping_rates() {
    let client = session_client();
    let base_url = storefront_url();
    start_checkout(&client, &base_url).await;

    edit(&client, &base_url, "province", &fixture("HARBOR_TEST_PROVINCE")).await;
    edit(&client, &base_url, "district", &fixture("HARBOR_TEST_DISTRICT")).await;
    let fragment = edit(&client, &base_url, "ward", &fixture("HARBOR_TEST_WARD")).await;

    assert!(fragment.contains("id=\"checkout-form\""));
    assert!(fragment.contains("name=\"rate_id\""));
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce API"]
async fn test_guest_checkout_places_order() {
    let client = session_client();
    let base_url = storefront_url();
    start_checkout(&client, &base_url).await;

    edit(&client, &base_url, "email", "integration@example.vn").await;
    edit(&client, &base_url, "first_name", "Lan").await;
    edit(&client, &base_url, "last_name", "Nguyen").await;
    edit(&client, &base_url, "phone", "0912345678").await;
    edit(&client, &base_url, "address1", "12 Ly Thuong Kiet").await;
    edit(&client, &base_url, "province", &fixture("HARBOR_TEST_PROVINCE")).await;
    edit(&client, &base_url, "district", &fixture("HARBOR_TEST_DISTRICT")).await;
    edit(&client, &base_url, "ward", &fixture("HARBOR_TEST_WARD")).await;

    let resp = client
        .post(format!("{base_url}/checkout/payment-method"))
        .form(&[("payment_method", "cod")])
        .send()
        .await
        .expect("Failed to choose payment method");
    let fragment = resp.text().await.expect("Failed to read checkout fragment");
    assert!(!fragment.contains("class=\"blockers\""), "checkout still blocked");

    let resp = client
        .post(format!("{base_url}/checkout/complete"))
        .send()
        .await
        .expect("Failed to place order");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("Missing Location header")
        .to_string();
    assert!(location.starts_with("/checkout/thank-you/"));

    let resp = client
        .get(format!("{base_url}{location}"))
        .send()
        .await
        .expect("Failed to get thank-you page");
    assert_eq!(resp.status(), StatusCode::OK);

    // Cart was emptied
    let resp = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count");
    assert!(resp.text().await.expect("Failed to read badge").trim().is_empty());
}
