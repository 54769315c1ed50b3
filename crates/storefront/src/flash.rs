//! One-shot toast notifications.
//!
//! Full-page flows store a [`Flash`] in the session and redirect; the next
//! page renders it. HTMX fragment flows send it in an `HX-Trigger` header
//! instead, which `static/js/app.js` turns into a toast.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_sessions::Session;

use crate::models::keys;

/// Header htmx reads client-side events from.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Event fired after any cart change so badges and summaries refresh.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

impl ToastLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A message shown to the shopper once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: ToastLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Store a flash for the next page view.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return the pending flash, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.ok().flatten()
}

/// Build an `HX-Trigger` header value from plain events and an optional toast.
///
/// ```rust,ignore
/// hx_trigger(&[CART_UPDATED_EVENT], Some(&Flash::success("Added to cart")))
/// // {"cart-updated":null,"toast":{"level":"success","message":"Added to cart"}}
/// ```
#[must_use]
pub fn hx_trigger(events: &[&str], toast: Option<&Flash>) -> String {
    let mut map = Map::new();
    for event in events {
        map.insert((*event).to_string(), Value::Null);
    }
    if let Some(flash) = toast {
        map.insert(
            "toast".to_string(),
            serde_json::json!({
                "level": flash.level.as_str(),
                "message": flash.message,
            }),
        );
    }
    Value::Object(map).to_string()
}
