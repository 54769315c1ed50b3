//! Decoding of representative commerce API response bodies.

#![allow(clippy::unwrap_used)]

use harbor_core::{CurrencyCode, FinancialStatus, FulfillmentStatus, VariantId};
use harbor_storefront::api::{
    AuthSession, Cart, CollectionDetail, CollectionKind, Order, Paginated, Product,
};
use rust_decimal::Decimal;
use serde_json::json;

#[test]
fn test_product_with_options_and_sparse_variants() {
    let product: Product = serde_json::from_value(json!({
        "id": 42,
        "handle": "ao-dai-silk",
        "title": "Silk Ao Dai",
        "options": [
            { "name": "Size", "values": ["S", "M"] },
            { "name": "Color", "values": ["Red"] }
        ],
        "variants": [
            {
                "id": 4201,
                "title": "S / Red",
                "price": "1250000",
                "compare_at_price": "1500000",
                "available": false,
                "options": [
                    { "name": "Size", "value": "S" },
                    { "name": "Color", "value": "Red" }
                ],
                "image": { "url": "https://cdn.example.vn/ao-dai-s.jpg" }
            },
            { "id": 4202, "title": "M / Red", "price": "1150000" }
        ],
        "tags": ["silk", "new"],
        "currency": "VND"
    }))
    .unwrap();

    assert_eq!(product.description, "");
    assert!(product.images.is_empty());
    assert_eq!(product.options.len(), 2);
    assert_eq!(product.currency, Some(CurrencyCode::VND));

    // Availability defaults to true when the API omits it
    let default = product.default_variant().unwrap();
    assert_eq!(default.id, VariantId::new(4202));
    assert!(product.available());

    assert_eq!(
        product.price_range(),
        Some((Decimal::from(1_150_000), Decimal::from(1_250_000)))
    );
    assert_eq!(
        product.featured_image().unwrap().url,
        "https://cdn.example.vn/ao-dai-s.jpg"
    );
    assert!(!product.has_only_default_variant());
}

#[test]
fn test_collection_detail_flattens_collection_fields() {
    let detail: CollectionDetail = serde_json::from_value(json!({
        "id": 3,
        "handle": "tet",
        "title": "Tet Collection",
        "kind": "smart",
        "products_count": 30,
        "products": {
            "items": [],
            "page": 2,
            "per_page": 24,
            "total": 30
        }
    }))
    .unwrap();

    assert_eq!(detail.collection.handle, "tet");
    assert_eq!(detail.collection.kind, CollectionKind::Smart);
    assert_eq!(detail.products.page, 2);
    assert!(detail.products.has_previous());
}

#[test]
fn test_empty_product_page() {
    let page: Paginated<Product> = serde_json::from_value(json!({
        "items": [],
        "page": 1,
        "per_page": 24,
        "total": 0
    }))
    .unwrap();

    assert!(page.items.is_empty());
    assert!(!page.has_previous());
}

#[test]
fn test_cart_counts_quantities() {
    let cart: Cart = serde_json::from_value(json!({
        "token": "cart_91c2",
        "items": [
            {
                "id": 1,
                "variant_id": 1001,
                "product_handle": "linen-shirt",
                "title": "Linen Shirt",
                "variant_title": "M",
                "quantity": 2,
                "unit_price": "390000",
                "line_price": "780000"
            },
            {
                "id": 2,
                "variant_id": 2001,
                "product_handle": "canvas-tote",
                "title": "Canvas Tote",
                "quantity": 1,
                "unit_price": "150000",
                "line_price": "150000"
            }
        ],
        "subtotal": "930000"
    }))
    .unwrap();

    assert_eq!(cart.item_count(), 3);
    assert!(!cart.is_empty());
    assert!(cart.currency.is_none());
    assert_eq!(
        cart.subtotal_money(CurrencyCode::VND).to_string(),
        "930.000 ₫"
    );
}

#[test]
fn test_order_with_unknown_statuses() {
    let order: Order = serde_json::from_value(json!({
        "id": 5001,
        "number": "HB-1042",
        "created_at": "2026-02-14T08:30:00Z",
        "financial_status": "paid",
        "fulfillment_status": "awaiting_pickup",
        "items": [],
        "currency": "VND",
        "subtotal": "780000",
        "shipping_total": "30000",
        "total": "810000",
        "shipping_address": {
            "first_name": "Minh",
            "address1": "45 Le Loi",
            "ward": { "code": "26734", "name": "Ben Nghe" },
            "province": { "code": "79", "name": "Ho Chi Minh" }
        },
        "payment_method": "cod"
    }))
    .unwrap();

    assert_eq!(order.financial_status, FinancialStatus::Paid);
    assert_eq!(order.fulfillment_status, FulfillmentStatus::Other);
    assert_eq!(order.total, Decimal::from(810_000));
    assert_eq!(
        order.shipping_address.unwrap().one_line(),
        "45 Le Loi, Ben Nghe, Ho Chi Minh"
    );
}

#[test]
fn test_auth_session_without_expiry() {
    let session: AuthSession = serde_json::from_value(json!({
        "access_token": "tok_abc",
        "customer": {
            "id": 77,
            "email": "lan@example.vn",
            "first_name": "Lan"
        }
    }))
    .unwrap();

    assert_eq!(session.expires_in, None);
    assert_eq!(session.customer.full_name(), "Lan");
    assert_eq!(session.customer.default_address_id, None);
}
