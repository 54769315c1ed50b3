//! Authentication route handlers.
//!
//! Handles email/password login and registration against the commerce API.
//! The bearer token the API returns is kept server-side in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use harbor_core::{Email, Phone};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, AuthSession, LoginRequest, RegisterRequest};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{Flash, set_flash};
use crate::middleware::{clear_current_customer, set_current_customer, take_return_to};
use crate::models::CurrentCustomer;
use crate::page::PageContext;
use crate::state::AppState;

/// Shortest password the store accepts.
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

impl RegisterForm {
    /// Check the form and build the API request.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is invalid.
    pub fn validate(&self) -> std::result::Result<RegisterRequest, &'static str> {
        let email = Email::parse(&self.email).map_err(|_| "Enter a valid email address.")?;
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err("Enter your first and last name.");
        }
        let phone = match self.phone.trim() {
            "" => None,
            phone => Some(
                Phone::parse(phone)
                    .map_err(|_| "Enter a valid phone number.")?
                    .as_str()
                    .to_string(),
            ),
        };
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 8 characters.");
        }
        if self.password != self.password_confirm {
            return Err("Passwords do not match.");
        }

        Ok(RegisterRequest {
            email: email.into_inner(),
            password: self.password.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RegisterTemplate {
    fn with_error(ctx: PageContext, form: &RegisterForm, error: impl Into<String>) -> Self {
        Self {
            ctx,
            error: Some(error.into()),
            email: form.email.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            phone: form.phone.trim().to_string(),
        }
    }
}

/// Store the customer, then send them back where they were going.
async fn sign_in(session: &Session, auth: AuthSession, greeting: &str) -> Result<Response> {
    let customer = CurrentCustomer::from_auth(auth);
    set_current_customer(session, &customer).await?;
    set_sentry_user(&customer.id, Some(&customer.email));
    tracing::info!(customer_id = %customer.id, "Customer signed in");

    let target = take_return_to(session)
        .await
        .unwrap_or_else(|| "/account".to_string());
    set_flash(
        session,
        Flash::success(format!("{greeting}, {}!", customer.display_name())),
    )
    .await;
    Ok(Redirect::to(&target).into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(ctx: PageContext) -> impl IntoResponse {
    LoginTemplate {
        ctx,
        error: None,
        email: String::new(),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let render_error = |ctx, status: StatusCode, message: String, email: String| {
        (
            status,
            LoginTemplate {
                ctx,
                error: Some(message),
                email,
            },
        )
            .into_response()
    };

    if !Email::is_valid(&email) || form.password.is_empty() {
        return Ok(render_error(
            ctx,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Enter your email address and password.".to_string(),
            email,
        ));
    }

    let request = LoginRequest {
        email: email.clone(),
        password: form.password,
    };

    match state.api().login(&request).await {
        Ok(auth) => sign_in(&session, auth, "Welcome back").await,
        Err(ApiError::Unauthorized) => {
            tracing::info!("Login rejected");
            Ok(render_error(
                ctx,
                StatusCode::UNAUTHORIZED,
                "Incorrect email or password.".to_string(),
                email,
            ))
        }
        Err(e @ (ApiError::Validation(_) | ApiError::RateLimited(_))) => Ok(render_error(
            ctx,
            StatusCode::UNPROCESSABLE_ENTITY,
            e.user_message(),
            email,
        )),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(ctx: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        ctx,
        error: None,
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        phone: String::new(),
    }
}

/// Handle registration form submission. A new account is signed in
/// straight away.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(message) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                RegisterTemplate::with_error(ctx, &form, message),
            )
                .into_response());
        }
    };

    match state.api().register(&request).await {
        Ok(auth) => sign_in(&session, auth, "Welcome").await,
        Err(e @ (ApiError::Validation(_) | ApiError::RateLimited(_))) => {
            tracing::info!(error = %e, "Registration rejected");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                RegisterTemplate::with_error(ctx, &form, e.user_message()),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the customer and any checkout in progress. The cart is kept.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_customer(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();

    set_flash(&session, Flash::info("You have been signed out.")).await;
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            email: " lan@example.vn ".to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
            first_name: "Lan".to_string(),
            last_name: " Nguyen".to_string(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_register_validate_ok() {
        let request = form().validate().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(request.email, "lan@example.vn");
        assert_eq!(request.last_name, "Nguyen");
        assert!(request.phone.is_none());
    }

    #[test]
    fn test_register_rejects_short_password() {
        let mut form = form();
        form.password = "short".to_string();
        form.password_confirm = "short".to_string();
        assert_eq!(
            form.validate().err(),
            Some("Password must be at least 8 characters.")
        );
    }

    #[test]
    fn test_register_rejects_mismatch() {
        let mut form = form();
        form.password_confirm = "something else".to_string();
        assert_eq!(form.validate().err(), Some("Passwords do not match."));
    }

    #[test]
    fn test_register_rejects_bad_phone() {
        let mut form = form();
        form.phone = "12".to_string();
        assert_eq!(form.validate().err(), Some("Enter a valid phone number."));
    }

    #[test]
    fn test_register_requires_names() {
        let mut form = form();
        form.first_name = "  ".to_string();
        assert_eq!(
            form.validate().err(),
            Some("Enter your first and last name.")
        );
    }
}
