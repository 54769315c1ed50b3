//! Monetary amounts using decimal arithmetic.
//!
//! The commerce API sends amounts as decimal strings (`"125000"`,
//! `"19.90"`). They are parsed into [`rust_decimal::Decimal`] so cart and
//! checkout totals never pass through floating point.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors from parsing a currency code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    VND,
    USD,
    EUR,
    GBP,
    JPY,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::VND => "VND",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::JPY => "JPY",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::VND => "₫",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
        }
    }

    /// Number of digits after the decimal separator.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::VND | Self::JPY => 0,
            Self::USD | Self::EUR | Self::GBP => 2,
        }
    }

    /// Whether the symbol follows the amount (`125.000 ₫`) or precedes it (`$12.50`).
    #[must_use]
    pub const fn symbol_after(self) -> bool {
        matches!(self, Self::VND)
    }

    const fn group_separator(self) -> char {
        match self {
            Self::VND => '.',
            _ => ',',
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VND" => Ok(Self::VND),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "JPY" => Ok(Self::JPY),
            other => Err(MoneyError::UnsupportedCurrency(other.to_string())),
        }
    }
}

/// An amount of money in a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (dong, dollars - not cents).
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl Money {
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Format for display: `125.000 ₫`, `$1,250.00`.
    #[must_use]
    pub fn display(&self) -> String {
        let dp = self.currency.minor_units();
        let rounded = self.amount.round_dp(dp);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let plain = format!("{:.*}", dp as usize, rounded.abs());

        let (int_part, frac_part) = plain
            .split_once('.')
            .map_or((plain.as_str(), None), |(i, f)| (i, Some(f)));

        let mut grouped = group_digits(int_part, self.currency.group_separator());
        if let Some(frac) = frac_part {
            grouped.push('.');
            grouped.push_str(frac);
        }

        let sign = if negative { "-" } else { "" };
        if self.currency.symbol_after() {
            format!("{sign}{grouped} {}", self.currency.symbol())
        } else {
            format!("{sign}{}{grouped}", self.currency.symbol())
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert a separator every three digits from the right.
fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(amount: &str, currency: CurrencyCode) -> Money {
        Money::new(amount.parse().unwrap(), currency)
    }

    fn vnd(amount: &str) -> Money {
        money(amount, CurrencyCode::VND)
    }

    #[test]
    fn test_display_vnd_groups_with_dots() {
        assert_eq!(vnd("125000").display(), "125.000 ₫");
        assert_eq!(vnd("1250000").display(), "1.250.000 ₫");
        assert_eq!(vnd("500").display(), "500 ₫");
        assert_eq!(vnd("0").display(), "0 ₫");
    }

    #[test]
    fn test_display_vnd_rounds_fractional_input() {
        assert_eq!(vnd("99999.6").display(), "100.000 ₫");
    }

    #[test]
    fn test_display_usd_two_decimals() {
        let price = money("1250.5", CurrencyCode::USD);
        assert_eq!(price.display(), "$1,250.50");
        let price = money("19.99", CurrencyCode::USD);
        assert_eq!(price.display(), "$19.99");
    }

    #[test]
    fn test_display_negative() {
        let discount = vnd("-20000");
        assert_eq!(discount.display(), "-20.000 ₫");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("vnd".parse::<CurrencyCode>().unwrap(), CurrencyCode::VND);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("1", ','), "1");
        assert_eq!(group_digits("123", ','), "123");
        assert_eq!(group_digits("1234", ','), "1,234");
        assert_eq!(group_digits("1234567", '.'), "1.234.567");
    }
}
