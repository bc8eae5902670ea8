use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in integer cents.
///
/// All fee arithmetic stays in cents; conversion to major currency units only
/// happens when a value crosses the HTTP boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Value in major units (dollars), for wire responses only.
    #[allow(clippy::cast_precision_loss)]
    pub fn major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_mul(self, factor: i64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.major_units())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_units_conversion() {
        assert_eq!(Money::from_cents(1000).major_units(), 10.0);
        assert_eq!(Money::from_cents(1999).major_units(), 19.99);
        assert_eq!(Money::ZERO.major_units(), 0.0);
    }

    #[test]
    fn test_display_formats_dollars() {
        assert_eq!(Money::from_cents(2050).to_string(), "$20.50");
    }

    #[test]
    fn test_checked_mul_overflow() {
        assert_eq!(Money::from_cents(1000).checked_mul(3), Some(Money::from_cents(3000)));
        assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
    }
}
