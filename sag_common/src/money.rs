use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const PAISE_PER_RUPEE: i64 = 100;

/// A monetary amount in paise (hundredths of a rupee).
///
/// Amounts are stored and compared as integers. Conversion from floating-point rupee values only
/// happens at the system boundary, where user-supplied filter values arrive.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a rupee amount (as supplied in filter payloads) into paise, rounding to the
    /// nearest paisa.
    pub fn from_rupees(rupees: f64) -> Result<Self, MoneyConversionError> {
        if !rupees.is_finite() {
            return Err(MoneyConversionError(format!("{rupees} is not a finite amount")));
        }
        let paise = rupees * PAISE_PER_RUPEE as f64;
        if paise.abs() >= i64::MAX as f64 {
            return Err(MoneyConversionError(format!("{rupees} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(paise.round() as i64))
    }

    pub fn rupees(&self) -> f64 {
        self.0 as f64 / PAISE_PER_RUPEE as f64
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2}", self.rupees())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rupee_conversion_rounds_to_nearest_paisa() {
        assert_eq!(Money::from_rupees(12.34).unwrap(), Money::from(1234));
        assert_eq!(Money::from_rupees(0.0).unwrap(), Money::from(0));
        assert_eq!(Money::from_rupees(199.99).unwrap(), Money::from(19999));
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        assert!(Money::from_rupees(f64::NAN).is_err());
        assert!(Money::from_rupees(f64::INFINITY).is_err());
    }

    #[test]
    fn arithmetic_and_display() {
        let total = Money::from(19999) + Money::from(1);
        assert_eq!(total.rupees(), 200.0);
        assert_eq!(total.to_string(), "₹200.00");
    }
}
