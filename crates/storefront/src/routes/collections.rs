//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::api::ProductSort;
use crate::error::Result;
use crate::filters;
use crate::page::PageContext;
use crate::routes::home::CollectionCardView;
use crate::routes::products::SortOptionView;
use crate::state::AppState;
use crate::views::{PaginationView, ProductCardView};

/// Query parameters for a collection page.
#[derive(Debug, Deserialize)]
pub struct CollectionParams {
    pub page: Option<u32>,
    pub sort: Option<String>,
}

/// Collection listing template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub ctx: PageContext,
    pub collections: Vec<CollectionCardView>,
}

/// Collection detail template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub ctx: PageContext,
    pub handle: String,
    pub title: String,
    pub description_html: String,
    pub products: Vec<ProductCardView>,
    pub sort_options: Vec<SortOptionView>,
    pub total: u64,
    pub pagination: PaginationView,
}

/// Display all collections.
#[instrument(skip(state, ctx))]
pub async fn index(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let collections = state.api().get_collections().await?;

    Ok(CollectionsIndexTemplate {
        ctx,
        collections: collections.iter().map(CollectionCardView::from).collect(),
    })
}

/// Display one collection with a page of its products.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(handle): Path<String>,
    Query(params): Query<CollectionParams>,
) -> Result<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let sort = ProductSort::from_query(params.sort.as_deref());

    let detail = state.api().get_collection(&handle, page, sort).await?;
    let products = &detail.products;

    let path = format!("/collections/{}", detail.collection.handle);
    let pagination = PaginationView::new(
        products.page,
        products.total_pages(),
        &path,
        &[("sort", sort.as_str())],
    );

    Ok(CollectionShowTemplate {
        ctx,
        handle: detail.collection.handle.clone(),
        title: detail.collection.title.clone(),
        description_html: detail.collection.description.clone(),
        products: ProductCardView::list(&products.items, state.currency()),
        sort_options: SortOptionView::all(sort),
        total: products.total,
        pagination,
    })
}
