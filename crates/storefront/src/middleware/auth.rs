//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.

use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::clear_sentry_user;
use crate::flash::{Flash, set_flash};
use crate::models::{CurrentCustomer, keys};

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in customer.
///
/// If nobody is signed in, or the token has expired, the request path is
/// remembered and the visitor is sent to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection returned when a customer is required but not signed in.
pub enum AuthRejection {
    /// Redirect to login page (full page requests).
    RedirectToLogin,
    /// HTMX requests get a client-side redirect instead of a 303.
    HtmxRedirect,
    /// No session layer.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::HtmxRedirect => (
                StatusCode::UNAUTHORIZED,
                AppendHeaders([("HX-Redirect", LOGIN_PATH)]),
            )
                .into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;

        let is_htmx = parts.headers.contains_key("HX-Request");
        let rejection = if is_htmx {
            AuthRejection::HtmxRedirect
        } else {
            AuthRejection::RedirectToLogin
        };

        let customer = session
            .get::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten();

        match customer {
            Some(customer) if !customer.is_expired() => Ok(Self(customer)),
            Some(_) => {
                tracing::info!("Customer token expired, signing out");
                let _ = clear_current_customer(&session).await;
                remember_return_to(&session, parts).await;
                Err(rejection)
            }
            None => {
                remember_return_to(&session, parts).await;
                Err(rejection)
            }
        }
    }
}

/// Remember where to send the customer after login. Only GET pages are
/// worth returning to.
async fn remember_return_to(session: &Session, parts: &Parts) {
    if parts.method != axum::http::Method::GET {
        return;
    }
    let path = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);
    let _ = session.insert(keys::RETURN_TO, path).await;
}

/// Response marker: the API rejected the customer's token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Sign the customer out when a handler reports a rejected token.
///
/// Must sit inside the session layer.
pub async fn expire_session_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::info!("API rejected customer token, signing out");
        if let Err(e) = clear_current_customer(&session).await {
            tracing::warn!(error = %e, "Failed to clear expired customer session");
        }
        clear_sentry_user();
        set_flash(
            &session,
            Flash::info("Your session has expired. Please sign in again."),
        )
        .await;
    }

    response
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(customer): OptionalAuth,
/// ) -> impl IntoResponse {
///     match customer {
///         Some(c) => format!("Hello, {}!", c.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten()
                .filter(|customer| !customer.is_expired()),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Helper to set the current customer in the session.
///
/// Cycles the session ID to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_CUSTOMER, customer).await
}

/// Helper to sign the customer out.
///
/// Clears the customer, the checkout form and the checkout token. The cart
/// is kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
        .await?;
    session
        .remove::<serde_json::Value>(keys::CHECKOUT_FORM)
        .await?;
    session.remove::<String>(keys::CHECKOUT_TOKEN).await?;
    Ok(())
}

/// Take the remembered post-login path, if it is a local path.
pub async fn take_return_to(session: &Session) -> Option<String> {
    session
        .remove::<String>(keys::RETURN_TO)
        .await
        .ok()
        .flatten()
        .filter(|path| is_local_path(path))
}

/// Only same-site absolute paths are valid redirect targets.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
