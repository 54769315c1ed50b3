//! Order status enums.
//!
//! The commerce API reports payment and fulfillment progress separately. Both
//! enums accept unknown values as `Other` so a new status on the API side
//! never breaks the order history page.

use serde::{Deserialize, Serialize};

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    #[default]
    Pending,
    Authorized,
    PartiallyPaid,
    Paid,
    PartiallyRefunded,
    Refunded,
    Voided,
    #[serde(other)]
    Other,
}

impl FinancialStatus {
    /// Human-readable label for order pages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Awaiting payment",
            Self::Authorized => "Authorized",
            Self::PartiallyPaid => "Partially paid",
            Self::Paid => "Paid",
            Self::PartiallyRefunded => "Partially refunded",
            Self::Refunded => "Refunded",
            Self::Voided => "Voided",
            Self::Other => "Processing",
        }
    }
}

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[default]
    Unfulfilled,
    PartiallyFulfilled,
    Fulfilled,
    Delivered,
    Cancelled,
    Returned,
    #[serde(other)]
    Other,
}

impl FulfillmentStatus {
    /// Human-readable label for order pages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unfulfilled => "Preparing",
            Self::PartiallyFulfilled => "Partially shipped",
            Self::Fulfilled => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
            Self::Other => "In progress",
        }
    }

    /// Whether the order can no longer change.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Returned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_status_snake_case() {
        let status: FinancialStatus = serde_json::from_str("\"partially_refunded\"").unwrap();
        assert_eq!(status, FinancialStatus::PartiallyRefunded);
    }

    #[test]
    fn test_unknown_status_falls_back_to_other() {
        let status: FulfillmentStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, FulfillmentStatus::Other);
        assert_eq!(status.label(), "In progress");
    }

    #[test]
    fn test_final_statuses() {
        assert!(FulfillmentStatus::Delivered.is_final());
        assert!(!FulfillmentStatus::Fulfilled.is_final());
    }
}
