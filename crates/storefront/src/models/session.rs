//! Session-related types.
//!
//! Types stored in the server-side session for authentication and checkout
//! state. The session cookie only carries the session ID.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use harbor_core::CustomerId;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::api::{AuthSession, Customer};

/// Session-stored customer identity.
///
/// Minimal data needed to render the header and call customer endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub email: String,
    pub first_name: Option<String>,
    /// Bearer token issued by the API. Only leaves the session through
    /// [`CurrentCustomer::token`].
    access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CurrentCustomer {
    /// Build the session identity from a login or registration response.
    #[must_use]
    pub fn from_auth(auth: AuthSession) -> Self {
        let expires_at = auth
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Self {
            id: auth.customer.id,
            email: auth.customer.email,
            first_name: auth.customer.first_name,
            access_token: auth.access_token,
            expires_at,
        }
    }

    /// Refresh the display fields after a profile fetch.
    pub fn update_profile(&mut self, customer: &Customer) {
        self.email.clone_from(&customer.email);
        self.first_name.clone_from(&customer.first_name);
    }

    /// The bearer token for customer API calls.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }

    /// Whether the token's advertised lifetime has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Name shown in the header.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

impl fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the cart token.
    pub const CART_TOKEN: &str = "cart_token";

    /// Key for the in-progress checkout token.
    pub const CHECKOUT_TOKEN: &str = "checkout_token";

    /// Key for the local checkout form mirror.
    pub const CHECKOUT_FORM: &str = "checkout_form";

    /// Key for the one-shot flash toast.
    pub const FLASH: &str = "flash";

    /// Key for the path to return to after login.
    pub const RETURN_TO: &str = "return_to";

    /// Key for the order just placed, shown on the thank-you page.
    pub const LAST_ORDER: &str = "last_order";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn auth(expires_in: Option<i64>) -> AuthSession {
        AuthSession {
            access_token: "tok_abcdef".to_string(),
            expires_in,
            customer: Customer {
                id: CustomerId::new(3),
                email: "lan@example.vn".to_string(),
                first_name: Some("Lan".to_string()),
                last_name: None,
                phone: None,
                default_address_id: None,
            },
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let customer = CurrentCustomer::from_auth(auth(None));
        let debug = format!("{customer:?}");
        assert!(!debug.contains("tok_abcdef"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(customer.token().expose_secret(), "tok_abcdef");
    }

    #[test]
    fn test_expiry() {
        assert!(!CurrentCustomer::from_auth(auth(None)).is_expired());
        assert!(!CurrentCustomer::from_auth(auth(Some(3600))).is_expired());

        let mut customer = CurrentCustomer::from_auth(auth(Some(3600)));
        customer.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(customer.is_expired());
    }

    #[test]
    fn test_session_roundtrip_keeps_token() {
        let customer = CurrentCustomer::from_auth(auth(Some(60)));
        let json = serde_json::to_string(&customer).unwrap();
        let back: CurrentCustomer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token().expose_secret(), "tok_abcdef");
        assert_eq!(back.display_name(), "Lan");
    }
}
