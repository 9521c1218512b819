//! Validation errors and checked input types
//!
//! All user input is validated before it reaches a repository.
//! Invalid input returns `ValidationError`, not panic.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for plate numbers
const MAX_PLATE_LEN: usize = 16;

/// Maximum length for usernames
const MAX_USERNAME_LEN: usize = 32;

/// Maximum length for free-text fields (descriptions, notes)
pub const MAX_TEXT_LEN: usize = 2048;

/// Plate pattern: uppercase alphanumeric, inner spaces/hyphens allowed
static PLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9](?:[A-Z0-9 -]*[A-Z0-9])?$").expect("invalid plate regex")
});

/// Username pattern: lowercase slug, may contain dots
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("invalid username regex")
});

/// "HH:MM", 24-hour clock
static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]$").expect("invalid clock regex")
});

/// Validation error for domain input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format
    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Invalid enum variant
    #[error("invalid {field} value: '{value}'")]
    InvalidVariant { field: &'static str, value: String },

    /// Number outside the accepted range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// Date range with end before start
    #[error("{field} ends before it starts")]
    InvertedRange { field: &'static str },
}

/// Require a non-blank string no longer than `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Like [`require_text`] but for optional fields; `None` passes.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_text(field, v, max),
        None => Ok(()),
    }
}

/// Require `min <= value <= max`.
pub fn require_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// Require `end >= start` when an end date is present.
pub fn require_ordered_dates(
    field: &'static str,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => Err(ValidationError::InvertedRange { field }),
        _ => Ok(()),
    }
}

/// Require a non-negative amount (cost, price).
pub fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a non-negative number",
        });
    }
    Ok(())
}

/// Validate a 24-hour "HH:MM" clock time.
pub fn require_clock_time(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !CLOCK_RE.is_match(value) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a 24-hour HH:MM time",
        });
    }
    Ok(())
}

/// Validated vehicle plate numbers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlateNumbers(String);

impl PlateNumbers {
    /// Create plate numbers, validating format.
    ///
    /// # Rules
    /// - Max 16 characters
    /// - Uppercase letters, digits, inner spaces or hyphens
    ///
    /// # Example
    /// ```
    /// use fleet_core::PlateNumbers;
    ///
    /// assert!(PlateNumbers::new("ABC1234").is_ok());
    /// assert!(PlateNumbers::new("abc1234").is_err());
    /// assert!(PlateNumbers::new("-ABC").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty {
                field: "plate numbers",
            });
        }

        if s.len() > MAX_PLATE_LEN {
            return Err(ValidationError::TooLong {
                field: "plate numbers",
                max: MAX_PLATE_LEN,
            });
        }

        if !PLATE_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "plate numbers",
                reason: "must be uppercase letters and digits, optionally separated by spaces or hyphens",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PlateNumbers {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlateNumbers {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PlateNumbers> for String {
    fn from(value: PlateNumbers) -> Self {
        value.0
    }
}

/// Validated login name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username (lowercase slug, dots allowed, max 32 chars).
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        if s.len() > MAX_USERNAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_USERNAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "must be lowercase alphanumeric with dots, hyphens or underscores",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "description",
            max: 2048,
        };
        assert_eq!(
            err.to_string(),
            "description exceeds maximum length of 2048 characters"
        );
    }

    #[test]
    fn valid_plates() {
        assert!(PlateNumbers::new("ABC1234").is_ok());
        assert!(PlateNumbers::new("AB-1234").is_ok());
        assert!(PlateNumbers::new("12 345").is_ok());
        assert!(PlateNumbers::new("X").is_ok());
    }

    #[test]
    fn rejects_bad_plates() {
        assert!(matches!(
            PlateNumbers::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            PlateNumbers::new("abc123").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            PlateNumbers::new("ABC-").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            PlateNumbers::new(&"A".repeat(17)).unwrap_err(),
            ValidationError::TooLong { max: 16, .. }
        ));
    }

    #[test]
    fn plate_deserializes_through_validation() {
        let plate: PlateNumbers = serde_json::from_str("\"ABC1234\"").unwrap();
        assert_eq!(plate.as_str(), "ABC1234");
        assert!(serde_json::from_str::<PlateNumbers>("\"abc\"").is_err());
    }

    #[test]
    fn usernames() {
        assert!(Username::new("j.doe").is_ok());
        assert!(Username::new("JDoe").is_err());
        assert!(Username::new(".hidden").is_err());
    }

    #[test]
    fn text_rules() {
        assert!(require_text("name", "  ", 10).is_err());
        assert!(require_text("name", "ok", 10).is_ok());
        assert!(require_text("name", "elevenchars", 10).is_err());
        assert!(optional_text("phone", None, 5).is_ok());
    }

    #[test]
    fn ranges_and_dates() {
        assert!(require_range("year", 1899, 1900, 2100).is_err());
        assert!(require_range("year", 2020, 1900, 2100).is_ok());

        let start = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert!(require_ordered_dates("vacation", start, Some(before)).is_err());
        assert!(require_ordered_dates("vacation", start, Some(start)).is_ok());
        assert!(require_ordered_dates("vacation", start, None).is_ok());
    }

    #[test]
    fn clock_times() {
        assert!(require_clock_time("departure", "07:30").is_ok());
        assert!(require_clock_time("departure", "23:59").is_ok());
        assert!(require_clock_time("departure", "24:00").is_err());
        assert!(require_clock_time("departure", "7:30").is_err());
    }

    #[test]
    fn amounts() {
        assert!(require_non_negative("cost", 0.0).is_ok());
        assert!(require_non_negative("cost", -0.01).is_err());
        assert!(require_non_negative("cost", f64::NAN).is_err());
    }
}
