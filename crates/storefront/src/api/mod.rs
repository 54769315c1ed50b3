//! Commerce REST API client.
//!
//! # Architecture
//!
//! - The commerce API is the source of truth; the storefront keeps no copy
//! - Catalog, region and payment-method reads are cached in memory via `moka`
//! - Customer calls carry the customer's bearer token from the session
//!
//! # Example
//!
//! ```rust,ignore
//! use harbor_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let product = client.get_product("linen-shirt").await?;
//! let cart = client.create_cart().await?;
//! let cart = client
//!     .add_cart_item(&cart.token, product.variants[0].id, 1)
//!     .await?;
//! ```

mod cache;
mod cart;
mod catalog;
mod checkout;
mod client;
mod customer;
mod regions;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired or rejected customer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API rejected the request body.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success status.
    #[error("API returned {0}: {1}")]
    Status(u16, String),
}

impl ApiError {
    /// Message safe to show a shopper in a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound(_) => "We couldn't find what you were looking for.".to_string(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please wait a moment and try again.".to_string(),
            Self::Http(_) | Self::Parse(_) | Self::Status(..) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether the error means the customer's token is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = ApiError::Validation("Phone number is invalid".to_string());
        assert_eq!(err.user_message(), "Phone number is invalid");
    }

    #[test]
    fn test_status_error_hides_details() {
        let err = ApiError::Status(502, "<html>bad gateway</html>".to_string());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_error_predicates() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::NotFound("cart".to_string()).is_unauthorized());
    }
}
