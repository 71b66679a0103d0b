//! Product rating with one decimal place of precision.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The input string is empty.
    #[error("rating cannot be empty")]
    Empty,
    /// The input is not a number.
    #[error("rating must be a number, got '{0}'")]
    Invalid(String),
    /// NaN or infinity.
    #[error("rating must be a finite number")]
    NotFinite,
}

/// A product rating, always held rounded to one decimal place.
///
/// Values are rounded half away from zero on construction, so `4.25`
/// becomes `4.3` and `3.04` becomes `3.0`. The server may send the value
/// as a JSON number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "RatingRepr", into = "f64")]
pub struct Rating(f64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RatingRepr {
    Number(f64),
    Text(String),
}

impl Rating {
    /// Create a rating, rounding to one decimal place.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::NotFinite`] for NaN or infinite values.
    pub fn new(value: f64) -> Result<Self, RatingError> {
        if !value.is_finite() {
            return Err(RatingError::NotFinite);
        }
        Ok(Self((value * 10.0).round() / 10.0))
    }

    /// Parse a rating from form input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not a finite number.
    pub fn parse(s: &str) -> Result<Self, RatingError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RatingError::Empty);
        }
        let value = trimmed
            .parse::<f64>()
            .map_err(|_| RatingError::Invalid(trimmed.to_owned()))?;
        Self::new(value)
    }

    /// The rounded value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl FromStr for Rating {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<RatingRepr> for Rating {
    type Error = RatingError;

    fn try_from(repr: RatingRepr) -> Result<Self, Self::Error> {
        match repr {
            RatingRepr::Number(value) => Self::new(value),
            RatingRepr::Text(text) => Self::parse(&text),
        }
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_rounds_to_one_decimal() {
        assert!((Rating::new(4.26).unwrap().value() - 4.3).abs() < f64::EPSILON);
        assert!((Rating::new(3.04).unwrap().value() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rating_display_always_shows_one_decimal() {
        assert_eq!(Rating::new(4.0).unwrap().to_string(), "4.0");
        assert_eq!(Rating::parse("3.75").unwrap().to_string(), "3.8");
    }

    #[test]
    fn test_rating_rejects_non_numbers() {
        assert_eq!(Rating::parse(""), Err(RatingError::Empty));
        assert_eq!(
            Rating::parse("great"),
            Err(RatingError::Invalid("great".to_owned()))
        );
        assert_eq!(Rating::new(f64::NAN), Err(RatingError::NotFinite));
    }

    #[test]
    fn test_rating_deserializes_from_number_or_string() {
        let a: Rating = serde_json::from_str("4.5").unwrap();
        let b: Rating = serde_json::from_str("\"4.5\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "4.5");
    }
}
