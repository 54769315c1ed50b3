//! Display types shared by templates.
//!
//! Money is formatted here, so templates only print strings.

use harbor_core::{CurrencyCode, Money};
use rust_decimal::Decimal;

use crate::api::{Address, Cart, Image, LineItem, Location, Order, Product, ShippingAddress};

/// Variant title the API uses for products without options.
const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// Format an amount in a currency.
#[must_use]
pub fn format_money(amount: Decimal, currency: CurrencyCode) -> String {
    Money::new(amount, currency).display()
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    #[must_use]
    pub fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt
                .clone()
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| fallback_alt.to_string()),
        }
    }
}

/// Product tile in grids.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    /// "From 90.000 ₫" when variants differ in price.
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image: Option<ImageView>,
    pub available: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, fallback: CurrencyCode) -> Self {
        let currency = product.currency.unwrap_or(fallback);
        let price = match product.price_range() {
            Some((min, max)) if min == max => format_money(min, currency),
            Some((min, _)) => format!("From {}", format_money(min, currency)),
            None => String::new(),
        };
        let compare_at_price = product
            .default_variant()
            .filter(|variant| variant.on_sale())
            .and_then(|variant| variant.compare_at_price)
            .map(|amount| format_money(amount, currency));

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price,
            compare_at_price,
            image: product
                .featured_image()
                .map(|image| ImageView::new(image, &product.title)),
            available: product.available(),
        }
    }

    pub fn list(products: &[Product], fallback: CurrencyCode) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, fallback)).collect()
    }
}

/// Previous/next links for paginated listings.
#[derive(Debug, Clone, Default)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl PaginationView {
    /// Build links under `path`, keeping `params` and replacing `page`.
    #[must_use]
    pub fn new(page: u32, total_pages: u32, path: &str, params: &[(&str, &str)]) -> Self {
        let link = |target: u32| {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in params {
                if !value.is_empty() {
                    query.append_pair(key, value);
                }
            }
            if target > 1 {
                query.append_pair("page", &target.to_string());
            }
            let query = query.finish();
            if query.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{query}")
            }
        };

        Self {
            page,
            total_pages,
            prev_url: (page > 1).then(|| link(page - 1)),
            next_url: (page < total_pages).then(|| link(page + 1)),
        }
    }

    #[must_use]
    pub const fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone)]
pub struct LineItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
    pub image: Option<ImageView>,
}

impl LineItemView {
    #[must_use]
    pub fn new(item: &LineItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.to_string(),
            handle: item.product_handle.clone(),
            title: item.title.clone(),
            variant_title: item
                .variant_title
                .clone()
                .filter(|title| !title.is_empty() && title != DEFAULT_VARIANT_TITLE),
            quantity: item.quantity,
            unit_price: format_money(item.unit_price, currency),
            line_price: format_money(item.line_price, currency),
            image: item.image.as_ref().map(|image| ImageView::new(image, &item.title)),
        }
    }

    pub fn list(items: &[LineItem], currency: CurrencyCode) -> Vec<Self> {
        items.iter().map(|item| Self::new(item, currency)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<LineItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, fallback: CurrencyCode) -> Self {
        let currency = cart.currency.unwrap_or(fallback);
        Self {
            items: LineItemView::list(&cart.items, currency),
            subtotal: cart.subtotal_money(fallback).display(),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            subtotal: format_money(Decimal::ZERO, currency),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Orders & Addresses
// =============================================================================

#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub id: String,
    pub number: String,
    pub placed_on: String,
    pub financial_status: &'static str,
    pub fulfillment_status: &'static str,
    pub total: String,
    pub item_count: u32,
}

impl OrderSummaryView {
    #[must_use]
    pub fn new(order: &Order, fallback: CurrencyCode) -> Self {
        let currency = order.currency.unwrap_or(fallback);
        Self {
            id: order.id.to_string(),
            number: order.number.clone(),
            placed_on: order.created_at.format("%d/%m/%Y").to_string(),
            financial_status: order.financial_status.label(),
            fulfillment_status: order.fulfillment_status.label(),
            total: format_money(order.total, currency),
            item_count: order.items.iter().map(|item| item.quantity).sum(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub summary: OrderSummaryView,
    pub items: Vec<LineItemView>,
    pub subtotal: String,
    pub shipping_total: String,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
}

impl OrderDetailView {
    #[must_use]
    pub fn new(order: &Order, fallback: CurrencyCode) -> Self {
        let currency = order.currency.unwrap_or(fallback);
        Self {
            summary: OrderSummaryView::new(order, fallback),
            items: LineItemView::list(&order.items, currency),
            subtotal: format_money(order.subtotal, currency),
            shipping_total: format_money(order.shipping_total, currency),
            shipping_address: order
                .shipping_address
                .as_ref()
                .map(ShippingAddress::one_line)
                .filter(|line| !line.is_empty()),
            payment_method: order.payment_method.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddressView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub line: String,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            name: address.full_name(),
            phone: address.phone.clone(),
            line: address.one_line(),
            is_default: address.is_default,
        }
    }
}

/// An `<option>` in a province, district or ward picker.
#[derive(Debug, Clone)]
pub struct LocationOptionView {
    pub code: String,
    pub name: String,
    pub selected: bool,
}

impl LocationOptionView {
    pub fn list(locations: &[Location], selected: Option<&str>) -> Vec<Self> {
        locations
            .iter()
            .map(|location| Self {
                code: location.code.clone(),
                name: location.name.clone(),
                selected: selected == Some(location.code.as_str()),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_links() {
        let view = PaginationView::new(2, 3, "/products", &[("sort", "price-asc"), ("q", "")]);
        assert_eq!(view.prev_url.as_deref(), Some("/products?sort=price-asc"));
        assert_eq!(
            view.next_url.as_deref(),
            Some("/products?sort=price-asc&page=3")
        );
        assert!(view.is_needed());
    }

    #[test]
    fn test_pagination_single_page() {
        let view = PaginationView::new(1, 1, "/collections/tea", &[]);
        assert!(view.prev_url.is_none());
        assert!(view.next_url.is_none());
        assert!(!view.is_needed());
    }

    #[test]
    fn test_pagination_encodes_query() {
        let view = PaginationView::new(1, 2, "/products", &[("q", "áo dài")]);
        assert_eq!(
            view.next_url.as_deref(),
            Some("/products?q=%C3%A1o+d%C3%A0i&page=2")
        );
    }

    #[test]
    fn test_line_item_hides_default_variant_title() {
        let item: LineItem = serde_json::from_str(
            r#"{"id": 1, "variant_id": 2, "product_handle": "tea", "title": "Tea",
                "variant_title": "Default Title", "quantity": 2,
                "unit_price": "45000", "line_price": "90000"}"#,
        )
        .unwrap();
        let view = LineItemView::new(&item, CurrencyCode::VND);
        assert!(view.variant_title.is_none());
        assert_eq!(view.line_price, "90.000 ₫");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty(CurrencyCode::VND);
        assert!(view.is_empty());
        assert_eq!(view.subtotal, "0 ₫");
    }

    #[test]
    fn test_location_options_mark_selected() {
        let locations = [
            Location {
                code: "01".to_string(),
                name: "Ha Noi".to_string(),
            },
            Location {
                code: "79".to_string(),
                name: "Ho Chi Minh".to_string(),
            },
        ];
        let options = LocationOptionView::list(&locations, Some("79"));
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert!(LocationOptionView::list(&locations, None).iter().all(|o| !o.selected));
    }
}
