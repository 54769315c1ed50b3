//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::api::{Collection, ProductQuery, ProductSort};
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::{ImageView, ProductCardView};

/// Featured collections shown on the home page.
const FEATURED_COLLECTIONS: usize = 4;

/// Newest products shown on the home page.
const NEW_ARRIVALS: u32 = 8;

/// Collection tile.
#[derive(Clone)]
pub struct CollectionCardView {
    pub handle: String,
    pub title: String,
    pub image: Option<ImageView>,
}

impl From<&Collection> for CollectionCardView {
    fn from(collection: &Collection) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            image: collection
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &collection.title)),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub collections: Vec<CollectionCardView>,
    pub products: Vec<ProductCardView>,
}

/// Display the home page.
///
/// A failing API call leaves its section empty instead of failing the page.
#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> impl IntoResponse {
    let query = ProductQuery {
        per_page: NEW_ARRIVALS,
        sort: ProductSort::Newest,
        ..ProductQuery::default()
    };

    let (collections, products) = tokio::join!(
        state.api().get_collections(),
        state.api().get_products(&query),
    );

    let collections = collections
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load collections"))
        .unwrap_or_default()
        .iter()
        .take(FEATURED_COLLECTIONS)
        .map(CollectionCardView::from)
        .collect();

    let products = products
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load new arrivals"))
        .map(|page| ProductCardView::list(&page.items, state.currency()))
        .unwrap_or_default();

    HomeTemplate {
        ctx,
        collections,
        products,
    }
}
