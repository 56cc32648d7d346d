//! Amount type for handling non-negative Rupiah values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include an `Rp` prefix and comma thousands separators, and the `AmountCell`
//! type which keeps the raw text of a cell that could not be parsed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Represents a non-negative amount of money in Rupiah, at most `u64::MAX`.
///
/// Sums and scaling saturate at `Decimal::MAX` instead of overflowing.
///
/// Equality and ordering are numeric, so `20000` and `20000.0` are the same amount.
///
/// # Examples
///
/// ```
/// # use expense_dash::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rp 1,250,000").unwrap();
/// assert_eq!(amount.to_string(), "Rp 1,250,000");
/// assert_eq!(amount.plain(), "1250000");
/// ```
///
/// Negative values are rejected:
/// ```
/// # use expense_dash::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-5000").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates an `Amount`, returning an error if `value` is negative or larger than
    /// `u64::MAX`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value.to_string()));
        }
        if value > Decimal::from(u64::MAX) {
            return Err(AmountError::TooLarge(value.to_string()));
        }
        Ok(Self(value.abs()))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The value without prefix or separators, e.g. `20000`. This is what is written back to the
    /// sheet and submitted to the form.
    pub fn plain(&self) -> String {
        self.0.normalize().to_string()
    }

    /// The value as an `f64`, for chart series.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Multiplies the amount by a non-negative factor, e.g. for chart bounds.
    pub fn scale(&self, factor: Decimal) -> Amount {
        Amount(self.0.checked_mul(factor).map_or(Decimal::MAX, |v| v.abs()))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AmountError {
    Empty,
    NotANumber(String),
    Negative(String),
    TooLarge(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "the amount is empty"),
            AmountError::NotANumber(s) => write!(f, "'{s}' is not a number"),
            AmountError::Negative(s) => write!(f, "'{s}' is negative"),
            AmountError::TooLarge(s) => write!(f, "'{s}' is too large"),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let without_prefix = trimmed
            .strip_prefix("Rp.")
            .or_else(|| trimmed.strip_prefix("Rp"))
            .unwrap_or(trimmed)
            .trim();

        // Remove commas (thousand separators)
        let without_commas = without_prefix.replace(',', "");
        let value = Decimal::from_str(&without_commas)
            .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "Rp {}", group_thousands(&rounded.trunc().to_string()))
    }
}

/// Inserts a comma between every group of three digits, counted from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (len - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.plain())
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

/// The content of an amount cell in the sheet. A cell that does not hold a non-negative number
/// is kept verbatim as `Invalid` so it can be reported; it never counts as zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AmountCell {
    Valid(Amount),
    Invalid(String),
}

impl AmountCell {
    /// Parses `s`, keeping the raw text when it is not a valid amount.
    pub fn parse(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        match Amount::from_str(s) {
            Ok(amount) => AmountCell::Valid(amount),
            Err(_) => AmountCell::Invalid(s.trim().to_string()),
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match self {
            AmountCell::Valid(amount) => Some(*amount),
            AmountCell::Invalid(_) => None,
        }
    }

    /// The cell as it is written back to a raw table.
    pub fn raw(&self) -> String {
        match self {
            AmountCell::Valid(amount) => amount.plain(),
            AmountCell::Invalid(s) => s.clone(),
        }
    }
}

impl Default for AmountCell {
    fn default() -> Self {
        AmountCell::Invalid(String::new())
    }
}

impl From<Amount> for AmountCell {
    fn from(value: Amount) -> Self {
        AmountCell::Valid(value)
    }
}

impl Serialize for AmountCell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw())
    }
}

impl<'de> Deserialize<'de> for AmountCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AmountCell::parse(s))
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
        let amount = Amount::from_str("20000").unwrap();
        assert_eq!(amount.value(), dec("20000"));
    }

    #[test]
    fn test_parse_with_prefix_and_commas() {
        let amount = Amount::from_str("Rp 1,234,567").unwrap();
        assert_eq!(amount.value(), dec("1234567"));
        let amount = Amount::from_str("Rp.15,000").unwrap();
        assert_eq!(amount.value(), dec("15000"));
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  5000  ").unwrap();
        assert_eq!(amount.value(), dec("5000"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Amount::from_str(""), Err(AmountError::Empty));
        assert_eq!(Amount::from_str("   "), Err(AmountError::Empty));
        assert_eq!(
            Amount::from_str("abc"),
            Err(AmountError::NotANumber("abc".to_string()))
        );
        assert!(matches!(
            Amount::from_str("-100"),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(
            Amount::from_str("18446744073709551615").unwrap(),
            Amount::from(u64::MAX)
        );
        assert!(matches!(
            Amount::from_str("18446744073709551616"),
            Err(AmountError::TooLarge(_))
        ));
        assert_eq!(
            AmountCell::parse("79228162514264337593543950335"),
            AmountCell::Invalid("79228162514264337593543950335".to_string())
        );
    }

    #[test]
    fn test_add_and_scale_saturate() {
        let max = Amount(Decimal::MAX);
        assert_eq!(max + Amount::from(1), max);
        assert_eq!(max.scale(dec("1.5")), max);
        let total: Amount = vec![max, max, Amount::from(5)].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_numeric_equality() {
        let a = Amount::from_str("20000").unwrap();
        let b = Amount::from_str("20000.0").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from(20000).to_string(), "Rp 20,000");
        assert_eq!(Amount::from(0).to_string(), "Rp 0");
        assert_eq!(Amount::from(1500000).to_string(), "Rp 1,500,000");
        assert_eq!(Amount::from(999).to_string(), "Rp 999");
        assert_eq!(
            Amount::from(u64::MAX).to_string(),
            "Rp 18,446,744,073,709,551,615"
        );
        assert_eq!(Amount::from_str("1234.5").unwrap().to_string(), "Rp 1,235");
        assert_eq!(Amount::from_str("1234.49").unwrap().to_string(), "Rp 1,234");
        assert_eq!(Amount::from_str("-0").unwrap().to_string(), "Rp 0");
    }

    #[test]
    fn test_plain() {
        assert_eq!(Amount::from_str("20000.00").unwrap().plain(), "20000");
        assert_eq!(Amount::from_str("12.50").unwrap().plain(), "12.5");
    }

    #[test]
    fn test_sum() {
        let total: Amount = [Amount::from(1000), Amount::from(2500)].iter().sum();
        assert_eq!(total, Amount::from(3500));
        let empty: Amount = Vec::<Amount>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_scale() {
        let scaled = Amount::from(1000).scale(dec("1.5"));
        assert_eq!(scaled, Amount::from(1500));
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(
            AmountCell::parse("5000"),
            AmountCell::Valid(Amount::from(5000))
        );
        assert_eq!(
            AmountCell::parse(" abc "),
            AmountCell::Invalid("abc".to_string())
        );
        assert_eq!(AmountCell::parse(""), AmountCell::Invalid(String::new()));
        assert_eq!(AmountCell::parse("abc").amount(), None);
    }

    #[test]
    fn test_cell_serde() {
        let cell = AmountCell::Valid(Amount::from(5000));
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, "\"5000\"");
        let back: AmountCell = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cell);

        let bad: AmountCell = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(bad, AmountCell::Invalid("abc".to_string()));
    }
}
