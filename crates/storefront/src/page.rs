//! Per-request data every full page renders in its layout.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::flash::{Flash, take_flash};
use crate::middleware::CspNonce;
use crate::models::{CurrentCustomer, keys};
use crate::state::AppState;

/// A footer link to a content page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterLink {
    pub slug: String,
    pub title: String,
}

/// Layout data: CSP nonce, signed-in customer, pending toast, footer links.
///
/// Extracting it consumes the session flash, so only full-page handlers
/// should ask for it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub nonce: String,
    pub customer_name: Option<String>,
    pub flash: Option<Flash>,
    pub path: String,
    pub footer_links: Vec<FooterLink>,
}

impl PageContext {
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.customer_name.is_some()
    }

    /// Whether a nav link points at the current section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            return self.path == "/";
        }
        self.path.starts_with(prefix)
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|n| n.value().to_string())
            .unwrap_or_default();

        let (customer_name, flash) = match parts.extensions.get::<Session>() {
            Some(session) => {
                let customer = session
                    .get::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
                    .await
                    .ok()
                    .flatten()
                    .filter(|c| !c.is_expired());
                (
                    customer.map(|c| c.display_name().to_string()),
                    take_flash(session).await,
                )
            }
            None => (None, None),
        };

        let footer_links = state
            .content()
            .pages_by_title()
            .into_iter()
            .map(|page| FooterLink {
                slug: page.slug.clone(),
                title: page.meta.title.clone(),
            })
            .collect();

        Ok(Self {
            nonce,
            customer_name,
            flash,
            path: parts.uri.path().to_string(),
            footer_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let ctx = PageContext {
            path: "/products/linen-shirt".to_string(),
            ..PageContext::default()
        };
        assert!(ctx.is_active("/products"));
        assert!(!ctx.is_active("/"));
        assert!(!ctx.is_active("/collections"));
        assert!(!ctx.signed_in());
    }
}
