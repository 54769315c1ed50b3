//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use harbor_core::{CurrencyCode, VariantId};
use serde::Deserialize;
use tracing::instrument;

use crate::api::{Product, ProductQuery, ProductSort, Variant};
use crate::error::Result;
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::{ImageView, PaginationView, ProductCardView, format_money};

/// Related products shown under a product.
const RELATED_LIMIT: usize = 4;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub page: Option<u32>,
    pub sort: Option<String>,
    pub q: Option<String>,
}

impl ProductListParams {
    /// Normalized API query: page at least 1, blank search dropped.
    #[must_use]
    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            page: self.page.unwrap_or(1).max(1),
            sort: ProductSort::from_query(self.sort.as_deref()),
            q: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
            ..ProductQuery::default()
        }
    }
}

/// Query parameters for the product page.
#[derive(Debug, Deserialize)]
pub struct ProductParams {
    pub variant: Option<VariantId>,
}

/// Sort option in the listing's sort picker.
#[derive(Clone)]
pub struct SortOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SortOptionView {
    #[must_use]
    pub fn all(current: ProductSort) -> Vec<Self> {
        ProductSort::ALL
            .into_iter()
            .map(|sort| Self {
                value: sort.as_str(),
                label: sort.label(),
                selected: sort == current,
            })
            .collect()
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductCardView>,
    pub sort_options: Vec<SortOptionView>,
    pub q: String,
    pub total: u64,
    pub pagination: PaginationView,
}

/// One entry in the variant picker.
#[derive(Clone)]
pub struct VariantOptionView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available: bool,
    pub selected: bool,
}

/// Product detail view.
#[derive(Clone)]
pub struct ProductDetailView {
    pub handle: String,
    pub title: String,
    pub vendor: Option<String>,
    pub description_html: String,
    pub images: Vec<ImageView>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub selected_variant_id: String,
    pub available: bool,
    /// Empty for products with a single default variant.
    pub variants: Vec<VariantOptionView>,
}

impl ProductDetailView {
    /// Build the view with `requested` preselected when the product has it.
    #[must_use]
    pub fn new(product: &Product, requested: Option<VariantId>, fallback: CurrencyCode) -> Self {
        let currency = product.currency.unwrap_or(fallback);
        let selected: Option<&Variant> = requested
            .and_then(|id| product.variants.iter().find(|v| v.id == id))
            .or_else(|| product.default_variant());

        let variants = if product.has_only_default_variant() {
            Vec::new()
        } else {
            product
                .variants
                .iter()
                .map(|variant| VariantOptionView {
                    id: variant.id.to_string(),
                    title: variant.title.clone(),
                    price: format_money(variant.price, currency),
                    available: variant.available,
                    selected: selected.is_some_and(|s| s.id == variant.id),
                })
                .collect()
        };

        let mut images: Vec<ImageView> = product
            .images
            .iter()
            .map(|image| ImageView::new(image, &product.title))
            .collect();
        if let Some(image) = selected.and_then(|v| v.image.as_ref()) {
            images.retain(|i| i.url != image.url);
            images.insert(0, ImageView::new(image, &product.title));
        }

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            vendor: product.vendor.clone().filter(|v| !v.is_empty()),
            description_html: product.description.clone(),
            images,
            price: selected
                .map(|v| format_money(v.price, currency))
                .unwrap_or_default(),
            compare_at_price: selected
                .filter(|v| v.on_sale())
                .and_then(|v| v.compare_at_price)
                .map(|amount| format_money(amount, currency)),
            selected_variant_id: selected.map(|v| v.id.to_string()).unwrap_or_default(),
            available: selected.is_some_and(|v| v.available),
            variants,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
}

/// Display the product listing.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse> {
    let query = params.to_query();
    let page = state.api().get_products(&query).await?;

    let q = query.q.clone().unwrap_or_default();
    let pagination = PaginationView::new(
        page.page,
        page.total_pages(),
        "/products",
        &[("sort", query.sort.as_str()), ("q", &q)],
    );

    Ok(ProductsIndexTemplate {
        ctx,
        products: ProductCardView::list(&page.items, state.currency()),
        sort_options: SortOptionView::all(query.sort),
        q,
        total: page.total,
        pagination,
    })
}

/// Display a product. Unknown handles render the 404 page.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(handle): Path<String>,
    Query(params): Query<ProductParams>,
) -> Result<impl IntoResponse> {
    let product = state.api().get_product(&handle).await?;

    let related = state
        .api()
        .get_related_products(&handle)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load related products"))
        .unwrap_or_default();
    let related: Vec<Product> = related
        .into_iter()
        .filter(|p| p.handle != product.handle)
        .take(RELATED_LIMIT)
        .collect();

    Ok(ProductShowTemplate {
        product: ProductDetailView::new(&product, params.variant, state.currency()),
        related: ProductCardView::list(&related, state.currency()),
        ctx,
    })
}
