//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number cannot be empty")]
    Empty,
    #[error("phone number may only contain digits, spaces, dots, dashes and a leading +")]
    InvalidCharacter,
    #[error("phone number must have between {min} and {max} digits")]
    Length { min: usize, max: usize },
}

/// A contact phone number, stored without separators.
///
/// Shoppers type numbers as `090 123 4567`, `090.123.4567` or
/// `+84 90 123 4567`; all of them normalize to digits with an optional
/// leading `+`.
///
/// ```
/// use harbor_core::Phone;
///
/// let phone = Phone::parse("090 123-4567").unwrap();
/// assert_eq!(phone.as_str(), "0901234567");
/// assert!(Phone::parse("12").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub const MIN_DIGITS: usize = 9;
    pub const MAX_DIGITS: usize = 15;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input is empty, contains letters or
    /// symbols, or has too few or too many digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (plus, rest) = s
            .strip_prefix('+')
            .map_or((false, s), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len() + 1);
        if plus {
            digits.push('+');
        }
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '.' | '-' | '(' | ')' => {}
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }

        let count = digits.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&count) {
            return Err(PhoneError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns `true` if the input would parse.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_separators() {
        assert_eq!(Phone::parse("090.123.4567").unwrap().as_str(), "0901234567");
        assert_eq!(Phone::parse("(090) 123 4567").unwrap().as_str(), "0901234567");
    }

    #[test]
    fn test_parse_keeps_leading_plus() {
        assert_eq!(
            Phone::parse("+84 90 123 4567").unwrap().as_str(),
            "+84901234567"
        );
    }

    #[test]
    fn test_parse_rejects_letters_and_inner_plus() {
        assert_eq!(Phone::parse("09012abc67"), Err(PhoneError::InvalidCharacter));
        assert_eq!(Phone::parse("0901+234567"), Err(PhoneError::InvalidCharacter));
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(Phone::parse("12345678"), Err(PhoneError::Length { .. })));
        assert!(Phone::parse("123456789").is_ok());
        assert!(matches!(
            Phone::parse("1234567890123456"),
            Err(PhoneError::Length { .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse("  "), Err(PhoneError::Empty));
    }
}
