//! Local checkout form mirrored against the remote checkout session.
//!
//! The form lives in the visitor's session. Every edit goes through
//! [`CheckoutForm`], which returns an [`EditOutcome`] telling the route what to
//! do next (push the change, refresh shipping rates, re-render). The remote
//! session is updated from [`CheckoutForm::to_update`] after each edit.

mod blocker;
mod form;

pub use blocker::PlaceOrderBlocker;
pub use form::{CheckoutField, CheckoutForm, EditOutcome, FieldValue};

use thiserror::Error;

/// Errors from checkout form operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutFormError {
    /// A text value was given for a location field or vice versa.
    #[error("field {0} does not accept this kind of value")]
    ValueMismatch(CheckoutField),

    /// The rate is not among the rates offered for the current address.
    #[error("shipping rate {0} is not available")]
    UnknownShippingRate(String),

    #[error("payment method {0} is not available")]
    UnknownPaymentMethod(String),

    #[error("payment method {0} is disabled")]
    PaymentMethodDisabled(String),
}
