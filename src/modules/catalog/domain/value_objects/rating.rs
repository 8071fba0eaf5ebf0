use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::errors::{AppError, AppResult};

/// A single review score on the 1-10 scale with one decimal of precision.
///
/// Stored as tenths so sums and means over many reviews are exact and do not
/// depend on the order ratings are read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 10.0;

    const MIN_TENTHS: u8 = 10;
    const MAX_TENTHS: u8 = 100;

    /// Round to one decimal and validate the range.
    pub fn new(value: f64) -> AppResult<Self> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(AppError::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }

        Self::from_tenths((value * 10.0).round() as u8)
    }

    pub fn from_tenths(tenths: u8) -> AppResult<Self> {
        if !(Self::MIN_TENTHS..=Self::MAX_TENTHS).contains(&tenths) {
            return Err(AppError::InvalidInput(format!(
                "rating must be between {} and {} tenths, got {}",
                Self::MIN_TENTHS,
                Self::MAX_TENTHS,
                tenths
            )));
        }
        Ok(Self(tenths))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = AppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(Rating::new(7.46).unwrap().tenths(), 75);
        assert_eq!(Rating::new(7.44).unwrap().tenths(), 74);
        assert_eq!(Rating::new(10.0).unwrap().value(), 10.0);
        assert_eq!(Rating::new(1.0).unwrap().to_string(), "1.0");
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Rating::new(0.9).is_err());
        assert!(Rating::new(10.01).is_err());
        assert!(Rating::new(f64::NAN).is_err());
        assert!(Rating::from_tenths(101).is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        let rating: Rating = serde_json::from_str("8.5").unwrap();
        assert_eq!(rating.tenths(), 85);
        assert!(serde_json::from_str::<Rating>("11").is_err());
        assert_eq!(serde_json::to_string(&rating).unwrap(), "8.5");
    }
}
