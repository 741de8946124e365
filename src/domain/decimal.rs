//! Exact decimal amounts backed by rust_decimal.
//!
//! Token face amounts, decimal-scale factors, prices and USD values all flow
//! through this type so that no step of the replay or risk math touches
//! floating point.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Exact decimal used for face amounts, prices and USD values.
///
/// Serializes to a JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Convert an on-chain unsigned integer into a Decimal.
    ///
    /// Returns `None` when the value exceeds the 96-bit mantissa.
    pub fn from_u128(value: u128) -> Option<Self> {
        RustDecimal::from_u128(value).map(Decimal)
    }

    /// `10^exponent`, used for token decimal-scale factors.
    pub fn pow10(exponent: u32) -> Option<Self> {
        10u128.checked_pow(exponent).and_then(Self::from_u128)
    }

    /// Format without exponent notation and without trailing zeros.
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Division that reports overflow or a zero divisor as `None`.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    pub fn checked_mul(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    pub fn checked_add(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

// Arithmetic operations
impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_canonical_no_exponent() {
        let decimal = Decimal::from_str_canonical("123.4500").expect("parse failed");
        let formatted = decimal.to_canonical_string();
        assert!(!formatted.contains('e'));
        assert_eq!(formatted, "123.45");
    }

    #[test]
    fn test_decimal_arithmetic() {
        let a = Decimal::from_str_canonical("10.5").unwrap();
        let b = Decimal::from_str_canonical("2.5").unwrap();

        assert_eq!((a + b).to_canonical_string(), "13");
        assert_eq!((a - b).to_canonical_string(), "8");
        assert_eq!((a * b).to_canonical_string(), "26.25");
        assert_eq!((a / b).to_canonical_string(), "4.2");
    }

    #[test]
    fn test_from_u128_within_mantissa() {
        let wei = 1_500_000_000_000_000_000u128;
        let decimal = Decimal::from_u128(wei).unwrap();
        assert_eq!(decimal.to_canonical_string(), "1500000000000000000");
    }

    #[test]
    fn test_from_u128_overflow() {
        assert!(Decimal::from_u128(u128::MAX).is_none());
    }

    #[test]
    fn test_pow10() {
        assert_eq!(Decimal::pow10(0).unwrap(), Decimal::one());
        assert_eq!(Decimal::pow10(6).unwrap().to_canonical_string(), "1000000");
        assert_eq!(
            Decimal::pow10(18).unwrap().to_canonical_string(),
            "1000000000000000000"
        );
    }

    #[test]
    fn test_checked_div_by_zero() {
        let a = Decimal::from_str_canonical("1").unwrap();
        assert!(a.checked_div(Decimal::zero()).is_none());
    }

    #[test]
    fn test_checked_mul_and_add_overflow() {
        let big = Decimal::from_u128(70_000_000_000_000_000_000_000_000_000).unwrap();
        let ten = Decimal::from(10u64);
        assert!(big.checked_mul(ten).is_none());
        assert!(big.checked_add(big).is_none());
        assert_eq!(ten.checked_mul(ten), Some(Decimal::from(100u64)));
        assert_eq!(ten.checked_add(ten), Some(Decimal::from(20u64)));
    }

    #[test]
    fn test_sum() {
        let total: Decimal = ["1.5", "2", "0.5"]
            .iter()
            .map(|s| Decimal::from_str_canonical(s).unwrap())
            .sum();
        assert_eq!(total.to_canonical_string(), "4");
    }

    #[test]
    fn test_decimal_json_serialization() {
        let decimal = Decimal::from_str_canonical("123.456").unwrap();
        let json = serde_json::to_value(decimal).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }
}
