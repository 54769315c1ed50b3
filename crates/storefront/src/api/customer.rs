//! Customer authentication, profile, orders and saved addresses.
//!
//! Everything except login and registration requires the customer's bearer
//! token; an expired token surfaces as `ApiError::Unauthorized`.

use harbor_core::{AddressId, OrderId};
use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use super::types::{
    Address, AddressInput, AuthSession, Customer, LoginRequest, Order, Paginated, RegisterRequest,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or another error
    /// if the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        self.send(
            self.request(Method::POST, &["auth", "login"], None)
                .json(request),
        )
        .await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the email is taken or a field is
    /// rejected, or another error if the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ApiError> {
        self.send(
            self.request(Method::POST, &["auth", "register"], None)
                .json(request),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn get_customer(&self, token: &SecretString) -> Result<Customer, ApiError> {
        self.send(self.request(Method::GET, &["customers", "me"], Some(token)))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_orders(
        &self,
        token: &SecretString,
        page: u32,
    ) -> Result<Paginated<Order>, ApiError> {
        self.send(
            self.request(Method::GET, &["customers", "me", "orders"], Some(token))
                .query(&[("page", page.to_string())]),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not belong to the
    /// customer, or another error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_order(&self, token: &SecretString, id: OrderId) -> Result<Order, ApiError> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["customers", "me", "orders", &id], Some(token)))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn get_addresses(&self, token: &SecretString) -> Result<Vec<Address>, ApiError> {
        self.send(self.request(Method::GET, &["customers", "me", "addresses"], Some(token)))
            .await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Validation` if a field is rejected, or another error
    /// if the request fails.
    #[instrument(skip_all)]
    pub async fn create_address(
        &self,
        token: &SecretString,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        self.send(
            self.request(Method::POST, &["customers", "me", "addresses"], Some(token))
                .json(input),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Validation` if a field is rejected, or another error
    /// if the request fails.
    #[instrument(skip(self, token, input))]
    pub async fn update_address(
        &self,
        token: &SecretString,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        let id = id.to_string();
        self.send(
            self.request(
                Method::PATCH,
                &["customers", "me", "addresses", &id],
                Some(token),
            )
            .json(input),
        )
        .await
    }

    /// Mark a saved address as the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn set_default_address(
        &self,
        token: &SecretString,
        id: AddressId,
    ) -> Result<Address, ApiError> {
        let id = id.to_string();
        self.send(
            self.request(
                Method::PATCH,
                &["customers", "me", "addresses", &id],
                Some(token),
            )
            .json(&serde_json::json!({ "is_default": true })),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_address(&self, token: &SecretString, id: AddressId) -> Result<(), ApiError> {
        let id = id.to_string();
        self.send_empty(self.request(
            Method::DELETE,
            &["customers", "me", "addresses", &id],
            Some(token),
        ))
        .await
    }
}
