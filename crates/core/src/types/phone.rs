//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contains a character outside the allowed set.
    #[error("phone number cannot contain '{0}'")]
    DisallowedCharacter(char),
}

/// A phone number as typed by the customer.
///
/// Only digits, spaces, parentheses, hyphens and the plus sign are allowed.
/// The format itself is not checked and the empty string is valid, since
/// the phone number is optional.
///
/// ## Examples
///
/// ```
/// use certificate_order_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("+1 (555) 010-2030").is_ok());
/// assert!(PhoneNumber::parse("").is_ok());
/// assert!(PhoneNumber::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::DisallowedCharacter`] with the first character
    /// outside `0-9`, space, `(`, `)`, `-`, `+`.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        match s.chars().find(|c| !is_allowed(*c)) {
            Some(c) => Err(PhoneError::DisallowedCharacter(c)),
            None => Ok(Self(s.to_owned())),
        }
    }

    /// Replace the stored value, keeping the current one if `value` is rejected.
    ///
    /// Applied on every keystroke this makes the stored value converge to the
    /// allowed characters of what was typed.
    ///
    /// # Errors
    ///
    /// Returns the parse error; `self` is left untouched in that case.
    pub fn replace(&mut self, value: &str) -> Result<(), PhoneError> {
        *self = Self::parse(value)?;
        Ok(())
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no phone number was entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const fn is_allowed(c: char) -> bool {
    matches!(c, '0'..='9' | ' ' | '(' | ')' | '-' | '+')
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(PhoneNumber::parse("0123456789").is_ok());
        assert!(PhoneNumber::parse("+44 20 7946 0958").is_ok());
        assert!(PhoneNumber::parse("(555) 010-2030").is_ok());
    }

    #[test]
    fn test_parse_reports_first_bad_char() {
        assert_eq!(
            PhoneNumber::parse("12a3b"),
            Err(PhoneError::DisallowedCharacter('a'))
        );
        assert_eq!(
            PhoneNumber::parse("555\t1234"),
            Err(PhoneError::DisallowedCharacter('\t'))
        );
    }

    #[test]
    fn test_replace_rejected_keeps_previous() {
        let mut phone = PhoneNumber::parse("555").unwrap();
        assert!(phone.replace("555x").is_err());
        assert_eq!(phone.as_str(), "555");
    }

    #[test]
    fn test_keystrokes_converge_to_digits() {
        let mut phone = PhoneNumber::default();
        for c in "abc123".chars() {
            let typed = format!("{phone}{c}");
            let _ = phone.replace(&typed);
        }
        assert_eq!(phone.as_str(), "123");
    }

    #[test]
    fn test_serializes_as_string() {
        let phone = PhoneNumber::parse("+1 555").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+1 555\"");
    }

    #[test]
    fn test_deserialize_applies_character_rule() {
        let phone: PhoneNumber = serde_json::from_str("\"(555) 010-2030\"").unwrap();
        assert_eq!(phone.as_str(), "(555) 010-2030");

        let err = serde_json::from_str::<PhoneNumber>("\"call me\"").unwrap_err();
        assert!(err.to_string().contains("cannot contain 'c'"));
    }

    proptest! {
        #[test]
        fn prop_stored_value_only_has_allowed_chars(input in any::<String>()) {
            let mut phone = PhoneNumber::default();
            for c in input.chars() {
                let typed = format!("{phone}{c}");
                let _ = phone.replace(&typed);
            }
            let _ = phone.replace(&input);
            prop_assert!(phone.as_str().chars().all(is_allowed));
        }

        #[test]
        fn prop_allowed_input_is_kept_verbatim(input in "[0-9()+\\- ]{0,24}") {
            let phone = PhoneNumber::parse(&input).unwrap();
            prop_assert_eq!(phone.as_str(), input.as_str());
        }
    }
}
