//! Amount type for handling signed currency values.
//!
//! Sheet cells arrive as formatted strings such as `-$1,234.50`, `1234.5` or an empty cell. The
//! `Amount` type parses all of these into a `Decimal` so that sums are exact, and always writes
//! itself back out in currency form.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

/// Represents a signed currency amount.
///
/// # Examples
///
/// ```
/// # use spend_dash::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-$1,000.50").unwrap();
/// let b = Amount::from_str("-1000.5").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "-$1,000.50");
/// ```
///
/// Amounts can be summed:
/// ```
/// # use spend_dash::model::Amount;
/// # use std::str::FromStr;
/// let total: Amount = ["$10", "$5.25"]
///     .iter()
///     .map(|s| Amount::from_str(s).unwrap())
///     .sum();
/// assert_eq!(total.to_string(), "$15.25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True for amounts below zero. Zero is neither positive nor negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Lossy conversion used for chart geometry.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: rust_decimal::Error,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Unable to parse '{}' as an amount: {}", self.input, self.source)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let digits = unsigned
            .strip_prefix('$')
            .unwrap_or(unsigned)
            .replace(',', "");

        let value = Decimal::from_str(&digits).map_err(|source| AmountError {
            input: s.to_string(),
            source,
        })?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.abs().round_dp(2).to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", magnitude))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_dollar_and_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$60,000.00").unwrap();
        assert_eq!(amount.value(), dec("-60000.00"));
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert_eq!(Amount::from_str("").unwrap(), Amount::ZERO);
        assert_eq!(Amount::from_str("   ").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_parse_garbage() {
        let err = Amount::from_str("twelve").unwrap_err();
        assert!(err.to_string().contains("'twelve'"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(dec("50")).to_string(), "$50.00");
        assert_eq!(Amount::new(dec("-1234.5")).to_string(), "-$1,234.50");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_negative_zero_displays_without_sign() {
        let amount = Amount::from_str("-0.00").unwrap();
        assert!(!amount.is_negative());
        assert_eq!(amount.to_string(), "$0.00");
    }

    #[test]
    fn test_sum_and_arithmetic() {
        let values = vec![
            Amount::from_str("$10.10").unwrap(),
            Amount::from_str("-$0.10").unwrap(),
            Amount::from_str("5").unwrap(),
        ];
        let total: Amount = values.iter().sum();
        assert_eq!(total.value(), dec("15.00"));
        assert_eq!((total - Amount::new(dec("5"))).value(), dec("10.00"));
        assert_eq!((-total).value(), dec("-15.00"));
        assert_eq!((-total).abs(), total);
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("-50"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"-$50.00\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
