//! Checkout sessions.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use super::types::{Checkout, CheckoutUpdate, CreateCheckout, Order, ShippingRate};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Start a checkout from a cart.
    ///
    /// A customer token ties the checkout to the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, cart_token, customer_token))]
    pub async fn create_checkout(
        &self,
        cart_token: &str,
        email: Option<String>,
        customer_token: Option<&SecretString>,
    ) -> Result<Checkout, ApiError> {
        let body = CreateCheckout {
            cart_token: cart_token.to_string(),
            email,
        };
        self.send(
            self.request(Method::POST, &["checkouts"], customer_token)
                .json(&body),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the checkout expired, or another error
    /// if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_checkout(&self, token: &str) -> Result<Checkout, ApiError> {
        self.send(self.request(Method::GET, &["checkouts", token], None))
            .await
    }

    /// Push the full local checkout state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the API rejects a field, or another
    /// error if the request fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_checkout(
        &self,
        token: &str,
        update: &CheckoutUpdate,
    ) -> Result<Checkout, ApiError> {
        self.send(
            self.request(Method::PATCH, &["checkouts", token], None)
                .json(update),
        )
        .await
    }

    /// Shipping rates for the checkout's current address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_shipping_rates(&self, token: &str) -> Result<Vec<ShippingRate>, ApiError> {
        self.send(self.request(Method::GET, &["checkouts", token, "shipping-rates"], None))
            .await
    }

    /// Place the order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the checkout is incomplete, or
    /// another error if the request fails.
    #[instrument(skip(self, token, customer_token))]
    pub async fn complete_checkout(
        &self,
        token: &str,
        customer_token: Option<&SecretString>,
    ) -> Result<Order, ApiError> {
        self.send(
            self.request(Method::POST, &["checkouts", token, "complete"], customer_token)
                .json(&serde_json::json!({})),
        )
        .await
    }
}
