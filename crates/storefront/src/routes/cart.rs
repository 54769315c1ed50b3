//! Cart route handlers.
//!
//! The cart token lives in the session. Mutations answer with HTMX fragments
//! and an `HX-Trigger` carrying `cart-updated` and a toast, so the header
//! badge and any open cart summary refresh themselves.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use harbor_core::{LineItemId, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, Cart};
use crate::error::{FragmentError, Result, add_breadcrumb};
use crate::filters;
use crate::flash::{CART_UPDATED_EVENT, Flash, HX_TRIGGER, hx_trigger};
use crate::models::keys;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::CartView;

/// Largest quantity a single line accepts.
pub const MAX_QUANTITY: u32 = 99;

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: VariantId,
    pub quantity: Option<u32>,
}

/// Update cart line form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: LineItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: LineItemId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
}

/// Cart items fragment (for HTMX updates).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Helpers
// =============================================================================

/// Requested add quantity: one when absent, at most [`MAX_QUANTITY`].
#[must_use]
pub fn add_quantity(requested: Option<u32>) -> u32 {
    requested.unwrap_or(1).clamp(1, MAX_QUANTITY)
}

/// Load the session cart. A cart the API no longer knows is forgotten.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> Result<Option<Cart>> {
    let Some(token) = session.get::<String>(keys::CART_TOKEN).await? else {
        return Ok(None);
    };

    match state.api().get_cart(&token).await {
        Ok(cart) => Ok(Some(cart)),
        Err(ApiError::NotFound(_)) => {
            tracing::info!("Cart expired, dropping token");
            session.remove::<String>(keys::CART_TOKEN).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn cart_view(state: &AppState, cart: Option<&Cart>) -> CartView {
    cart.map_or_else(
        || CartView::empty(state.currency()),
        |cart| CartView::new(cart, state.currency()),
    )
}

fn cart_updated(message: &str) -> AppendHeaders<[(&'static str, String); 1]> {
    AppendHeaders([(
        HX_TRIGGER,
        hx_trigger(&[CART_UPDATED_EVENT], Some(&Flash::success(message))),
    )])
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let cart = current_cart(&state, &session).await?;

    Ok(CartShowTemplate {
        ctx,
        cart: cart_view(&state, cart.as_ref()),
    })
}

/// Add an item to the cart (HTMX).
///
/// Creates the cart on first use. Returns the updated count badge.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> std::result::Result<impl IntoResponse, FragmentError> {
    let quantity = add_quantity(form.quantity);
    let api = state.api();

    let cart = match session.get::<String>(keys::CART_TOKEN).await? {
        Some(token) => match api.add_cart_item(&token, form.variant_id, quantity).await {
            Err(ApiError::NotFound(_)) => None,
            result => Some(result?),
        },
        None => None,
    };

    let cart = match cart {
        Some(cart) => cart,
        None => {
            let cart = api.create_cart().await?;
            session.insert(keys::CART_TOKEN, &cart.token).await?;
            tracing::info!("Created cart");
            api.add_cart_item(&cart.token, form.variant_id, quantity)
                .await?
        }
    };

    let variant_id = form.variant_id.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("variant_id", &variant_id), ("quantity", &quantity.to_string())]),
    );

    Ok((
        cart_updated("Added to cart"),
        CartCountTemplate {
            count: cart.item_count(),
        },
    ))
}

/// Update a line's quantity (HTMX). Zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> std::result::Result<impl IntoResponse, FragmentError> {
    let token = session
        .get::<String>(keys::CART_TOKEN)
        .await?
        .ok_or_else(|| ApiError::NotFound("cart".to_string()))?;

    let (cart, message) = if form.quantity == 0 {
        let cart = state.api().remove_cart_item(&token, form.line_id).await?;
        (cart, "Removed from cart")
    } else {
        let quantity = form.quantity.min(MAX_QUANTITY);
        let cart = state
            .api()
            .update_cart_item(&token, form.line_id, quantity)
            .await?;
        (cart, "Cart updated")
    };

    Ok((
        cart_updated(message),
        CartItemsTemplate {
            cart: cart_view(&state, Some(&cart)),
        },
    ))
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> std::result::Result<impl IntoResponse, FragmentError> {
    let token = session
        .get::<String>(keys::CART_TOKEN)
        .await?
        .ok_or_else(|| ApiError::NotFound("cart".to_string()))?;

    let cart = state.api().remove_cart_item(&token, form.line_id).await?;

    Ok((
        cart_updated("Removed from cart"),
        CartItemsTemplate {
            cart: cart_view(&state, Some(&cart)),
        },
    ))
}

/// Get the cart count badge (HTMX).
///
/// Errors render an empty badge rather than a toast.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = current_cart(&state, &session)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load cart count"))
        .ok()
        .flatten()
        .map_or(0, |cart| cart.item_count());

    CartCountTemplate { count }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quantity_defaults_to_one() {
        assert_eq!(add_quantity(None), 1);
    }

    #[test]
    fn test_add_quantity_clamped() {
        assert_eq!(add_quantity(Some(0)), 1);
        assert_eq!(add_quantity(Some(3)), 3);
        assert_eq!(add_quantity(Some(500)), MAX_QUANTITY);
    }

    #[test]
    fn test_cart_updated_header() {
        let AppendHeaders([(name, value)]) = cart_updated("Cart updated");
        assert_eq!(name, HX_TRIGGER);
        assert!(value.contains(CART_UPDATED_EVENT));
        assert!(value.contains("Cart updated"));
    }
}
