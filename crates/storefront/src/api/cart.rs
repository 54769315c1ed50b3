//! Cart operations. Carts are never cached.

use harbor_core::{LineItemId, VariantId};
use reqwest::Method;
use tracing::instrument;

use super::types::{AddCartItem, Cart, UpdateCartItem};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, ApiError> {
        self.send(
            self.request(Method::POST, &["carts"], None)
                .json(&serde_json::json!({})),
        )
        .await
    }

    /// Get a cart by token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the cart expired, or another error if
    /// the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &str) -> Result<Cart, ApiError> {
        self.send(self.request(Method::GET, &["carts", token], None))
            .await
    }

    /// Add a variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn add_cart_item(
        &self,
        token: &str,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let body = AddCartItem {
            variant_id,
            quantity,
        };
        self.send(
            self.request(Method::POST, &["carts", token, "items"], None)
                .json(&body),
        )
        .await
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        line_id: LineItemId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let id = line_id.to_string();
        self.send(
            self.request(Method::PATCH, &["carts", token, "items", &id], None)
                .json(&UpdateCartItem { quantity }),
        )
        .await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_item(&self, token: &str, line_id: LineItemId) -> Result<Cart, ApiError> {
        let id = line_id.to_string();
        self.send(self.request(Method::DELETE, &["carts", token, "items", &id], None))
            .await
    }
}
