//! Contact form route handlers.
//!
//! Messages are forwarded to the commerce API, which notifies the store.

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

use crate::api::{ApiError, ContactMessage};
use crate::error::Result;
use crate::filters;
use crate::flash::{Flash, set_flash};
use crate::middleware::OptionalAuth;
use crate::page::PageContext;
use crate::state::AppState;

/// Longest message accepted.
const MAX_MESSAGE_LEN: usize = 5000;

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Check the form and build the API body.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is missing or invalid.
    pub fn validate(&self) -> std::result::Result<ContactMessage, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please tell us your name.");
        }
        let email = Email::parse(&self.email).map_err(|_| "Enter a valid email address.")?;
        let phone = match self.phone.trim() {
            "" => None,
            phone => Some(
                Phone::parse(phone)
                    .map_err(|_| "Enter a valid phone number.")?
                    .as_str()
                    .to_string(),
            ),
        };
        let message = self.message.trim();
        if message.is_empty() {
            return Err("Please enter a message.");
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err("Your message is too long.");
        }
        let subject = self.subject.trim();

        Ok(ContactMessage {
            name: name.to_string(),
            email: email.into_inner(),
            phone,
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            message: message.to_string(),
        })
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub form: ContactForm,
}

/// Display the contact form, prefilled for signed-in customers.
pub async fn show(OptionalAuth(customer): OptionalAuth, ctx: PageContext) -> impl IntoResponse {
    let form = customer
        .map(|customer| ContactForm {
            name: customer.first_name.clone().unwrap_or_default(),
            email: customer.email,
            ..ContactForm::default()
        })
        .unwrap_or_default();

    ContactTemplate {
        ctx,
        error: None,
        form,
    }
}

/// Send a contact message.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let message = match form.validate() {
        Ok(message) => message,
        Err(error) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ContactTemplate {
                    ctx,
                    error: Some(error.to_string()),
                    form,
                },
            )
                .into_response());
        }
    };

    match state.api().send_contact(&message).await {
        Ok(()) => {
            tracing::info!("Contact message sent");
            set_flash(
                &session,
                Flash::success("Thanks! We'll get back to you soon."),
            )
            .await;
            Ok(Redirect::to("/contact").into_response())
        }
        Err(e @ (ApiError::Validation(_) | ApiError::RateLimited(_))) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            ContactTemplate {
                ctx,
                error: Some(e.user_message()),
                form,
            },
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: "Lan".to_string(),
            email: "Lan@Example.VN".to_string(),
            message: "Do you ship to Da Nang?".to_string(),
            ..ContactForm::default()
        }
    }

    #[test]
    fn test_contact_validates() {
        let message = form().validate().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(message.email, "Lan@example.vn");
        assert!(message.phone.is_none());
        assert!(message.subject.is_none());
    }

    #[test]
    fn test_contact_requires_message() {
        let mut form = form();
        form.message = "   ".to_string();
        assert_eq!(form.validate().err(), Some("Please enter a message."));
    }

    #[test]
    fn test_contact_rejects_long_message() {
        let mut form = form();
        form.message = "a".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(form.validate().err(), Some("Your message is too long."));
    }
}
