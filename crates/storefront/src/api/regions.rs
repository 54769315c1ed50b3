//! Reference data (regions, payment methods) and the contact form.

use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{ContactMessage, Location, PaymentMethod};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_provinces(&self) -> Result<Vec<Location>, ApiError> {
        self.locations(CacheKey::Provinces, &["regions", "provinces"])
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_districts(&self, province_code: &str) -> Result<Vec<Location>, ApiError> {
        self.locations(
            CacheKey::Districts(province_code.to_string()),
            &["regions", "provinces", province_code, "districts"],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_wards(&self, district_code: &str) -> Result<Vec<Location>, ApiError> {
        self.locations(
            CacheKey::Wards(district_code.to_string()),
            &["regions", "districts", district_code, "wards"],
        )
        .await
    }

    async fn locations(&self, key: CacheKey, segments: &[&str]) -> Result<Vec<Location>, ApiError> {
        if let Some(CacheValue::Locations(locations)) = self.cached(&key).await {
            debug!("Cache hit for locations");
            return Ok(locations);
        }

        let locations: Vec<Location> = self
            .send(self.request(Method::GET, segments, None))
            .await?;

        self.cache(key, CacheValue::Locations(locations.clone()))
            .await;
        Ok(locations)
    }

    /// Payment methods the store offers, including disabled ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_payment_methods(&self) -> Result<Vec<PaymentMethod>, ApiError> {
        if let Some(CacheValue::PaymentMethods(methods)) =
            self.cached(&CacheKey::PaymentMethods).await
        {
            return Ok(methods);
        }

        let methods: Vec<PaymentMethod> = self
            .send(self.request(Method::GET, &["payment-methods"], None))
            .await?;

        self.cache(
            CacheKey::PaymentMethods,
            CacheValue::PaymentMethods(methods.clone()),
        )
        .await;
        Ok(methods)
    }

    /// Forward a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if a field is rejected, or another error
    /// if the request fails.
    #[instrument(skip_all, fields(email = %message.email))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        self.send_empty(
            self.request(Method::POST, &["contact"], None)
                .json(message),
        )
        .await
    }
}
