//! Cart line quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a quantity outside `Quantity::MIN..=Quantity::MAX`
/// is requested. Holds the rejected value.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity must be at least {min} (got {0})", min = Quantity::MIN.get())]
    TooSmall(i64),

    #[error("quantity must be at most {max} (got {0})", max = Quantity::MAX.get())]
    TooLarge(i64),
}

/// Number of units of a product in a cart line.
///
/// A quantity is never below one. Values decoded from JSON are clamped, so a
/// misbehaving server cannot put a zero or negative quantity into the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest allowed quantity.
    pub const MIN: Self = Self(1);

    /// Largest allowed quantity.
    pub const MAX: Self = Self(u32::MAX);

    /// Create a quantity, rejecting values outside `MIN..=MAX`.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::TooSmall` if `value < 1` and
    /// `QuantityError::TooLarge` if it does not fit in a `u32`.
    pub fn try_new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::TooSmall(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge(value))
    }

    /// Create a quantity, moving out-of-range values to the nearest bound.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        match Self::try_new(value) {
            Ok(quantity) => quantity,
            Err(QuantityError::TooSmall(_)) => Self::MIN,
            Err(QuantityError::TooLarge(_)) => Self::MAX,
        }
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_non_positive() {
        assert_eq!(Quantity::try_new(0), Err(QuantityError::TooSmall(0)));
        assert!(Quantity::try_new(-3).is_err());
        assert_eq!(Quantity::try_new(2).unwrap().get(), 2);
    }

    #[test]
    fn test_try_new_rejects_values_above_u32() {
        assert_eq!(
            Quantity::try_new(99_999_999_999),
            Err(QuantityError::TooLarge(99_999_999_999))
        );
        assert_eq!(Quantity::try_new(i64::from(u32::MAX)), Ok(Quantity::MAX));
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Quantity::clamped(0), Quantity::MIN);
        assert_eq!(Quantity::clamped(-10).get(), 1);
        assert_eq!(Quantity::clamped(5).get(), 5);
        assert_eq!(Quantity::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn test_deserialize_clamps() {
        let q: Quantity = serde_json::from_str("0").unwrap();
        assert_eq!(q.get(), 1);

        let q: Quantity = serde_json::from_str("-4").unwrap();
        assert_eq!(q.get(), 1);

        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(q.get(), 3);
    }

    #[test]
    fn test_error_message() {
        let err = QuantityError::TooSmall(0);
        assert_eq!(err.to_string(), "quantity must be at least 1 (got 0)");

        let err = QuantityError::TooLarge(5_000_000_000);
        assert_eq!(
            err.to_string(),
            "quantity must be at most 4294967295 (got 5000000000)"
        );
    }
}
