//! Phone number comparison key.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A phone number reduced to the digits used for matching.
///
/// Customers type their numbers in any format (`"(11) 98888-7777"`,
/// `"+55 11 98888-7777"`, `"11988887777"`). Two numbers are considered the
/// same when their keys are equal.
///
/// ## Normalization
///
/// - Every non-digit character is dropped
/// - If more than [`PhoneKey::SIGNIFICANT_DIGITS`] digits remain, only the
///   trailing ones are kept, which strips country-code prefixes
///
/// ## Examples
///
/// ```
/// use trailer_core::PhoneKey;
///
/// let local = PhoneKey::normalize("(11) 98888-7777");
/// let international = PhoneKey::normalize("+55 11 98888-7777");
///
/// assert_eq!(local.as_str(), "11988887777");
/// assert_eq!(local, international);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct PhoneKey(String);

impl PhoneKey {
    /// Number of trailing digits that identify a phone (area code + subscriber).
    pub const SIGNIFICANT_DIGITS: usize = 11;

    /// Normalize a free-form phone string into a comparison key.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
        let skip = digits.len().saturating_sub(Self::SIGNIFICANT_DIGITS);
        Self(digits.into_iter().skip(skip).collect())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the input contained no digits at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PhoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting() {
        assert_eq!(PhoneKey::normalize("(11) 98888-7777").as_str(), "11988887777");
        assert_eq!(PhoneKey::normalize("11 9 8888 7777").as_str(), "11988887777");
    }

    #[test]
    fn test_keeps_last_eleven_digits() {
        assert_eq!(
            PhoneKey::normalize("+55 (11) 98888-7777").as_str(),
            "11988887777"
        );
        assert_eq!(PhoneKey::normalize("005511988887777").as_str(), "11988887777");
    }

    #[test]
    fn test_short_numbers_are_kept_whole() {
        assert_eq!(PhoneKey::normalize("8888-7777").as_str(), "88887777");
    }

    #[test]
    fn test_no_digits_is_empty() {
        assert!(PhoneKey::normalize("").is_empty());
        assert!(PhoneKey::normalize("n/a").is_empty());
    }

    #[test]
    fn test_equal_after_normalization() {
        assert_eq!(
            PhoneKey::normalize("(11) 98888-7777"),
            PhoneKey::normalize("11988887777")
        );
    }
}
