//! Unified error handling with Sentry integration.
//!
//! Page handlers return `Result<T, AppError>`; HTMX fragment handlers return
//! `Result<T, FragmentError>`, which turns the same errors into a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutFormError;
use crate::filters;
use crate::flash::{Flash, HX_TRIGGER, hx_trigger};
use crate::middleware::auth::{LOGIN_PATH, SessionExpired};
use crate::page::PageContext;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Checkout form rejected an edit.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutFormError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => match err {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::Http(_) | ApiError::Parse(_) | ApiError::Status(..) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show the shopper. Internal details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Session(_) | Self::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Checkout(err) => match err {
                CheckoutFormError::UnknownShippingRate(_) => {
                    "That shipping method is no longer available.".to_string()
                }
                CheckoutFormError::UnknownPaymentMethod(_)
                | CheckoutFormError::PaymentMethodDisabled(_) => {
                    "That payment method is not available.".to_string()
                }
                CheckoutFormError::ValueMismatch(_) => "Invalid value.".to_string(),
            },
            Self::NotFound(_) => "We couldn't find what you were looking for.".to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(error) if error.is_unauthorized())
    }

    /// Capture server-side failures to Sentry.
    fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
    }
}

/// Full-page error.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub ctx: PageContext,
    pub status: u16,
    pub title: String,
    pub message: String,
}

impl ErrorTemplate {
    #[must_use]
    pub fn new(status: StatusCode, message: String) -> Self {
        let title = if status == StatusCode::NOT_FOUND {
            "Page not found".to_string()
        } else {
            status
                .canonical_reason()
                .unwrap_or("Something went wrong")
                .to_string()
        };
        Self {
            ctx: PageContext::default(),
            status: status.as_u16(),
            title,
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();

        if self.is_unauthorized() {
            let mut response = Redirect::to(LOGIN_PATH).into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        let status = self.status();
        (status, ErrorTemplate::new(status, self.user_message())).into_response()
    }
}

/// Error from an HTMX fragment handler.
///
/// Renders as an empty 200 with `HX-Reswap: none` and a toast, so the page
/// stays as it is and the shopper sees what went wrong. An expired customer
/// token becomes a client-side redirect to login.
#[derive(Debug)]
pub struct FragmentError(pub AppError);

impl From<AppError> for FragmentError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ApiError> for FragmentError {
    fn from(err: ApiError) -> Self {
        Self(AppError::Api(err))
    }
}

impl From<tower_sessions::session::Error> for FragmentError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(AppError::Session(err))
    }
}

impl From<CheckoutFormError> for FragmentError {
    fn from(err: CheckoutFormError) -> Self {
        Self(AppError::Checkout(err))
    }
}

impl IntoResponse for FragmentError {
    fn into_response(self) -> Response {
        let error = self.0;
        error.report();

        if error.is_unauthorized() {
            let mut response =
                (StatusCode::OK, AppendHeaders([("HX-Redirect", LOGIN_PATH)])).into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        let trigger = hx_trigger(&[], Some(&Flash::error(error.user_message())));
        (
            StatusCode::OK,
            AppendHeaders([(HX_TRIGGER, trigger), ("HX-Reswap", "none".to_string())]),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product linen-shirt".to_string());
        assert_eq!(err.to_string(), "Not found: product linen-shirt");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::RateLimited(3))),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status(500, String::new()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let response = AppError::Api(ApiError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("db password wrong".to_string());
        assert!(!err.user_message().contains("password"));
    }

    #[test]
    fn test_fragment_error_becomes_toast() {
        let response =
            FragmentError::from(ApiError::Validation("Ward is required".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Reswap"], "none");
        let trigger = response.headers()[HX_TRIGGER].to_str().unwrap_or_default();
        assert!(trigger.contains("Ward is required"));
        assert!(trigger.contains("\"error\""));
    }

    #[test]
    fn test_fragment_unauthorized_redirects() {
        let response = FragmentError(AppError::Api(ApiError::Unauthorized)).into_response();
        assert_eq!(response.headers()["HX-Redirect"], LOGIN_PATH);
    }
}
