//! Money amounts
//!
//! Funds and asking prices are integer units. Integer arithmetic keeps the
//! conservation invariant exact: a purchase debits and credits the same
//! number of units, so the total across all accounts never drifts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative amount of money, in integer units
///
/// The inner representation is `i64` so amounts convert losslessly to and
/// from sorted-set scores and `incr` deltas; the constructors refuse
/// negative values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero units
    pub const ZERO: Price = Price(0);

    /// Create a price from a signed unit count
    ///
    /// Returns None if `units` is negative.
    pub fn new(units: i64) -> Option<Price> {
        (units >= 0).then_some(Price(units))
    }

    /// Create a price from an unsigned unit count known at compile time
    pub const fn from_units(units: u32) -> Price {
        Price(units as i64)
    }

    /// The unit count
    pub fn units(&self) -> i64 {
        self.0
    }

    /// Checked addition; None on overflow
    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }

    /// Checked subtraction; None if the result would be negative
    pub fn checked_sub(self, other: Price) -> Option<Price> {
        let diff = self.0 - other.0;
        (diff >= 0).then_some(Price(diff))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_negative() {
        assert_eq!(Price::new(-1), None);
        assert_eq!(Price::new(0), Some(Price::ZERO));
        assert_eq!(Price::new(10).unwrap().units(), 10);
    }

    #[test]
    fn checked_sub_refuses_negative_result() {
        let ten = Price::from_units(10);
        let three = Price::from_units(3);
        assert_eq!(ten.checked_sub(three), Some(Price::from_units(7)));
        assert_eq!(three.checked_sub(ten), None);
    }

    #[test]
    fn checked_add_detects_overflow() {
        let max = Price::new(i64::MAX).unwrap();
        assert_eq!(max.checked_add(Price::from_units(1)), None);
        assert_eq!(
            Price::from_units(2).checked_add(Price::from_units(3)),
            Some(Price::from_units(5))
        );
    }

    #[test]
    fn display_is_plain_units() {
        assert_eq!(Price::from_units(42).to_string(), "42");
    }

    proptest::proptest! {
        #[test]
        fn add_then_sub_round_trips(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            let a = Price::new(a).unwrap();
            let b = Price::new(b).unwrap();
            let sum = a.checked_add(b).unwrap();
            proptest::prop_assert_eq!(sum.checked_sub(b), Some(a));
        }

        #[test]
        fn prices_are_never_negative(units in i64::MIN..0) {
            proptest::prop_assert_eq!(Price::new(units), None);
        }
    }
}
