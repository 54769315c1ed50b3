//! Reasons the place-order button is disabled.

use serde::Serialize;

/// A missing or invalid piece of the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceOrderBlocker {
    EmptyCart,
    InvalidEmail,
    MissingName,
    InvalidPhone,
    MissingAddress,
    IncompleteLocation,
    NoShippingRate,
    NoPaymentMethod,
}

impl PlaceOrderBlocker {
    /// Hint shown next to the disabled button.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty.",
            Self::InvalidEmail => "Enter a valid email address.",
            Self::MissingName => "Enter your first and last name.",
            Self::InvalidPhone => "Enter a valid phone number.",
            Self::MissingAddress => "Enter your street address.",
            Self::IncompleteLocation => "Choose a province, district and ward.",
            Self::NoShippingRate => "Choose a shipping method.",
            Self::NoPaymentMethod => "Choose a payment method.",
        }
    }
}
