//! Line item quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A line item quantity, always at least one.
///
/// Construction clamps instead of failing: zero, negative and non-numeric
/// input all become `1`, values above `u32::MAX` saturate.
///
/// ```
/// use storefront_core::Quantity;
///
/// assert_eq!(Quantity::clamped(3).get(), 3);
/// assert_eq!(Quantity::clamped(0).get(), 1);
/// assert_eq!(Quantity::clamped(-5).get(), 1);
/// assert_eq!(Quantity::parse_lenient("abc").get(), 1);
/// assert_eq!(Quantity::parse_lenient("4 shirts").get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// The smallest allowed quantity.
    pub const ONE: Self = Self(1);

    /// Clamp an arbitrary integer into a valid quantity.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        if value < 1 {
            Self::ONE
        } else {
            Self(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }

    /// Parse user input the way a quantity text box does.
    ///
    /// Leading whitespace and an optional sign are accepted, then the leading
    /// run of digits is used. Anything without digits falls back to `1`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed.get(1..).unwrap_or_default()),
            Some(b'+') => (false, trimmed.get(1..).unwrap_or_default()),
            _ => (false, trimmed),
        };
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = rest.get(..digits_end).unwrap_or_default();
        if digits.is_empty() || negative {
            return Self::ONE;
        }
        // Digit strings too long for i64 saturate like any oversized value.
        digits
            .parse::<i64>()
            .map_or(Self(u32::MAX), Self::clamped)
    }

    /// The raw quantity.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Apply a signed delta, clamping the result to at least one.
    #[must_use]
    pub fn offset(self, delta: i64) -> Self {
        Self::clamped(i64::from(self.0).saturating_add(delta))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error raised when deserializing a stored quantity below one.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("quantity must be a positive integer, got {0}")]
pub struct InvalidQuantity(pub i64);

impl TryFrom<i64> for Quantity {
    type Error = InvalidQuantity;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(InvalidQuantity(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| InvalidQuantity(value))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}
