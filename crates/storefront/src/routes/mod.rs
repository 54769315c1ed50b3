//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//!
//! # Catalog
//! GET  /products                      - Product listing (?page, sort, q)
//! GET  /products/{handle}             - Product detail (?variant)
//! GET  /collections                   - Collection listing
//! GET  /collections/{handle}          - Collection detail (?page, sort)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add to cart (returns count badge)
//! POST /cart/update                   - Update quantity (returns cart_items fragment)
//! POST /cart/remove                   - Remove item (returns cart_items fragment)
//! GET  /cart/count                    - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                      - Start or resume checkout
//! POST /checkout/field                - Edit one field (returns form fragment)
//! POST /checkout/address              - Use a saved address
//! POST /checkout/shipping-rate        - Choose shipping rate
//! POST /checkout/payment-method       - Choose payment method
//! GET  /checkout/districts            - District <option>s (?province)
//! GET  /checkout/wards                - Ward <option>s (?district)
//! POST /checkout/complete             - Place order
//! GET  /checkout/thank-you/{number}   - Order confirmation
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action
//! GET  /auth/register                 - Register page
//! POST /auth/register                 - Register action
//! POST /auth/logout                   - Logout action
//!
//! # Account (requires auth)
//! GET  /account                       - Account overview
//! GET  /account/orders                - Order history
//! GET  /account/orders/{id}           - Order detail
//! GET  /account/addresses             - Address book
//! POST /account/addresses             - Create address
//! GET  /account/addresses/new         - New address form
//! GET  /account/addresses/{id}/edit   - Edit address form
//! POST /account/addresses/{id}        - Update address
//! POST /account/addresses/{id}/delete - Delete address
//! POST /account/addresses/{id}/default - Make default
//!
//! # Content
//! GET  /pages/{slug}                  - Markdown content page
//! GET  /contact                       - Contact form
//! POST /contact                       - Send contact message
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod collections;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router. Form submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{handle}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route_layer(checkout_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/field", post(checkout::update_field))
        .route("/address", post(checkout::select_address))
        .route("/shipping-rate", post(checkout::select_shipping_rate))
        .route("/payment-method", post(checkout::select_payment_method))
        .route("/complete", post(checkout::complete))
        .route_layer(checkout_rate_limiter());

    Router::new()
        .route("/", get(checkout::show))
        .route("/districts", get(checkout::districts))
        .route("/wards", get(checkout::wards))
        .route("/thank-you/{number}", get(checkout::thank_you))
        .merge(mutations)
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/new", get(account::new_address))
        .route("/addresses/{id}", post(account::update_address))
        .route("/addresses/{id}/edit", get(account::edit_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
        .route("/addresses/{id}/default", post(account::set_default_address))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        // Cart & checkout
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        // Customer
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        // Content
        .route("/pages/{slug}", get(pages::show))
        .route("/contact", get(contact::show).post(contact::submit))
}
