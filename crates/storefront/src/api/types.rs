//! Data transfer types for the commerce REST API.
//!
//! These mirror the API's JSON bodies (snake_case fields). Optional fields are
//! `Option` or `#[serde(default)]`; the storefront owns none of these records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use harbor_core::{
    AddressId, CollectionId, CurrencyCode, CustomerId, FinancialStatus, FulfillmentStatus,
    LineItemId, Money, OrderId, ProductId, VariantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

// =============================================================================
// Shared Types
// =============================================================================

/// Product, variant or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    /// Number of pages, never less than one.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// A region node: province, district or ward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    pub name: String,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// Product option definition (e.g., "Size" with its values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    pub values: Vec<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub options: Vec<SelectedOption>,
    #[serde(default)]
    pub image: Option<Image>,
}

impl Variant {
    /// Whether the compare-at price shows a discount.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|compare| compare > self.price)
    }
}

/// A product with its variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    /// Description HTML.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
}

impl Product {
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images
            .first()
            .or_else(|| self.variants.iter().find_map(|v| v.image.as_ref()))
    }

    /// Lowest and highest variant price.
    #[must_use]
    pub fn price_range(&self) -> Option<(Decimal, Decimal)> {
        let min = self.variants.iter().map(|v| v.price).min()?;
        let max = self.variants.iter().map(|v| v.price).max()?;
        Some((min, max))
    }

    #[must_use]
    pub fn available(&self) -> bool {
        self.variants.iter().any(|v| v.available)
    }

    /// The variant preselected on the product page.
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.available)
            .or_else(|| self.variants.first())
    }

    /// Products with a single "Default Title" variant have no real options.
    #[must_use]
    pub fn has_only_default_variant(&self) -> bool {
        self.variants.len() == 1
            && self
                .variants
                .first()
                .is_some_and(|v| v.title == "Default Title")
    }
}

/// Sort orders the product listing supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
}

impl ProductSort {
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceAsc, Self::PriceDesc, Self::TitleAsc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::TitleAsc => "title-asc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::TitleAsc => "Name: A-Z",
        }
    }

    /// Parse the `sort` query value, falling back to newest.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| Some(s.as_str()) == value)
            .unwrap_or_default()
    }
}

/// Product listing query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: ProductSort,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 24,
            sort: ProductSort::default(),
            q: None,
            collection: None,
        }
    }
}

/// How a collection's products are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Smart,
    #[default]
    Manual,
}

/// A named grouping of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub kind: CollectionKind,
    #[serde(default)]
    pub products_count: Option<u32>,
}

/// A collection together with one page of its products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub products: Paginated<Product>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart or order entry referencing a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub variant_id: VariantId,
    pub product_handle: String,
    pub title: String,
    #[serde(default)]
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_price: Decimal,
    #[serde(default)]
    pub image: Option<Image>,
}

/// A shopping cart, addressed by an opaque token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub token: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    pub subtotal: Decimal,
}

impl Cart {
    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        total_quantity(&self.items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn subtotal_money(&self, fallback: CurrencyCode) -> Money {
        Money::new(self.subtotal, self.currency.unwrap_or(fallback))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddCartItem {
    pub variant_id: VariantId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}

// =============================================================================
// Address Types
// =============================================================================

/// A saved customer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub province: Location,
    pub district: Location,
    pub ward: Location,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    /// Single-line rendering: street, ward, district, province.
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            self.address1.as_str(),
            self.ward.name.as_str(),
            self.district.name.as_str(),
            self.province.name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Body for creating or updating a saved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub province_code: String,
    pub district_code: String,
    pub ward_code: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Shipping address as held by a checkout or order; any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub province: Option<Location>,
    #[serde(default)]
    pub district: Option<Location>,
    #[serde(default)]
    pub ward: Option<Location>,
}

impl ShippingAddress {
    #[must_use]
    pub fn one_line(&self) -> String {
        [
            self.address1.as_deref(),
            self.ward.as_ref().map(|l| l.name.as_str()),
            self.district.as_ref().map(|l| l.name.as_str()),
            self.province.as_ref().map(|l| l.name.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Shipping address body sent when updating a checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShippingAddressInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address1: String,
    pub province_code: Option<String>,
    pub district_code: Option<String>,
    pub ward_code: Option<String>,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// A shipping option offered for the checkout's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub delivery_estimate: Option<String>,
}

/// A payment method the store accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Server-side checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkout {
    pub token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub shipping_rates: Vec<ShippingRate>,
    #[serde(default)]
    pub shipping_rate_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping_total: Decimal,
    pub total: Decimal,
}

impl Checkout {
    #[must_use]
    pub fn item_count(&self) -> u32 {
        total_quantity(&self.items)
    }

    /// Whether the checkout holds the same variants in the same quantities
    /// as the cart, regardless of line order or splitting.
    #[must_use]
    pub fn same_lines_as(&self, cart: &Cart) -> bool {
        quantities_by_variant(&self.items) == quantities_by_variant(&cart.items)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckout {
    pub cart_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Full checkout state pushed to the API after each local change.
///
/// Every field is always serialized: `null` clears the value remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutUpdate {
    pub email: Option<String>,
    pub shipping_address: ShippingAddressInput,
    pub address_id: Option<AddressId>,
    pub shipping_rate_id: Option<String>,
    pub payment_method: Option<String>,
    pub note: Option<String>,
}

// =============================================================================
// Order Types
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub financial_status: FinancialStatus,
    #[serde(default)]
    pub fulfillment_status: FulfillmentStatus,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping_total: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

// =============================================================================
// Customer Types
// =============================================================================

/// The logged-in customer's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub default_address_id: Option<AddressId>,
}

impl Customer {
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
        )
    }
}

/// Response from login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub customer: Customer,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Contact-form message forwarded to the API.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

fn total_quantity(items: &[LineItem]) -> u32 {
    items
        .iter()
        .fold(0, |total: u32, item| total.saturating_add(item.quantity))
}

fn quantities_by_variant(items: &[LineItem]) -> BTreeMap<VariantId, u32> {
    let mut quantities = BTreeMap::new();
    for item in items.iter().filter(|item| item.quantity > 0) {
        let quantity: &mut u32 = quantities.entry(item.variant_id).or_default();
        *quantity = quantity.saturating_add(item.quantity);
    }
    quantities
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(id: i64, price: i64, available: bool) -> Variant {
        Variant {
            id: VariantId::new(id),
            title: format!("Variant {id}"),
            sku: None,
            price: Decimal::from(price),
            compare_at_price: None,
            available,
            options: Vec::new(),
            image: None,
        }
    }

    #[test]
    fn test_paginated_total_pages() {
        let page = Paginated::<u8> {
            items: Vec::new(),
            page: 1,
            per_page: 24,
            total: 49,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let empty = Paginated::<u8> {
            items: Vec::new(),
            page: 1,
            per_page: 24,
            total: 0,
        };
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_product_price_range_and_default_variant() {
        let product = Product {
            id: ProductId::new(1),
            handle: "tea".to_string(),
            title: "Tea".to_string(),
            description: String::new(),
            vendor: None,
            images: Vec::new(),
            options: Vec::new(),
            variants: vec![variant(1, 90_000, false), variant(2, 120_000, true)],
            tags: Vec::new(),
            currency: None,
        };

        assert_eq!(
            product.price_range(),
            Some((Decimal::from(90_000), Decimal::from(120_000)))
        );
        assert!(product.available());
        assert_eq!(product.default_variant().unwrap().id, VariantId::new(2));
        assert!(!product.has_only_default_variant());
    }

    #[test]
    fn test_product_sort_from_query() {
        assert_eq!(ProductSort::from_query(Some("price-desc")), ProductSort::PriceDesc);
        assert_eq!(ProductSort::from_query(Some("bogus")), ProductSort::Newest);
        assert_eq!(ProductSort::from_query(None), ProductSort::Newest);
    }

    #[test]
    fn test_variant_on_sale() {
        let mut v = variant(1, 100, true);
        assert!(!v.on_sale());
        v.compare_at_price = Some(Decimal::from(150));
        assert!(v.on_sale());
    }

    #[test]
    fn test_cart_item_count_sums_quantities() {
        let json = r#"{
            "token": "c_1",
            "subtotal": "300000",
            "items": [
                {"id": 1, "variant_id": 10, "product_handle": "a", "title": "A",
                 "quantity": 2, "unit_price": "100000", "line_price": "200000"},
                {"id": 2, "variant_id": 11, "product_handle": "b", "title": "B",
                 "quantity": 1, "unit_price": "100000", "line_price": "100000"}
            ]
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), 3);
        assert_eq!(
            cart.subtotal_money(CurrencyCode::VND).display(),
            "300.000 ₫"
        );
    }

    #[test]
    fn test_shipping_address_one_line_skips_missing_parts() {
        let address = ShippingAddress {
            address1: Some("12 Hang Bac".to_string()),
            province: Some(Location {
                code: "01".to_string(),
                name: "Ha Noi".to_string(),
            }),
            ..ShippingAddress::default()
        };
        assert_eq!(address.one_line(), "12 Hang Bac, Ha Noi");
    }

    #[test]
    fn test_customer_full_name() {
        let customer = Customer {
            id: CustomerId::new(1),
            email: "a@b.vn".to_string(),
            first_name: Some("Lan".to_string()),
            last_name: None,
            phone: None,
            default_address_id: None,
        };
        assert_eq!(customer.full_name(), "Lan");
    }

    fn line(id: i64, variant_id: i64, quantity: u32) -> LineItem {
        LineItem {
            id: LineItemId::new(id),
            variant_id: VariantId::new(variant_id),
            product_handle: format!("product-{variant_id}"),
            title: format!("Product {variant_id}"),
            variant_title: None,
            quantity,
            unit_price: Decimal::from(100_000),
            line_price: Decimal::from(100_000) * Decimal::from(quantity),
            image: None,
        }
    }

    fn cart_with(items: Vec<LineItem>) -> Cart {
        Cart {
            token: "cart_1".to_string(),
            items,
            currency: None,
            subtotal: Decimal::ZERO,
        }
    }

    fn checkout_with(items: Vec<LineItem>) -> Checkout {
        Checkout {
            token: "chk_1".to_string(),
            email: None,
            shipping_address: None,
            address_id: None,
            shipping_rates: Vec::new(),
            shipping_rate_id: None,
            payment_method: None,
            note: None,
            items,
            currency: None,
            subtotal: Decimal::ZERO,
            shipping_total: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    #[test]
    fn test_swapped_line_with_equal_count_is_not_the_same_checkout() {
        let checkout = checkout_with(vec![line(1, 10, 1)]);
        let cart = cart_with(vec![line(2, 11, 1)]);

        assert_eq!(checkout.item_count(), cart.item_count());
        assert!(!checkout.same_lines_as(&cart));
    }

    #[test]
    fn test_same_lines_ignores_order_and_splitting() {
        let checkout = checkout_with(vec![line(1, 10, 2), line(2, 11, 1)]);
        let cart = cart_with(vec![line(7, 11, 1), line(8, 10, 1), line(9, 10, 1)]);
        assert!(checkout.same_lines_as(&cart));

        let cart = cart_with(vec![line(7, 11, 1), line(8, 10, 1)]);
        assert!(!checkout.same_lines_as(&cart));
    }

    #[test]
    fn test_item_count_saturates() {
        let cart = cart_with(vec![line(1, 10, u32::MAX), line(2, 11, 5)]);
        assert_eq!(cart.item_count(), u32::MAX);
    }
}
