//! Amount type for handling monetary values with optional currency symbols.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a currency symbol, thousands separators and surrounding whitespace.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// The currency prefixes stripped when parsing.
const SYMBOLS: [&str; 3] = ["₦", "NGN", "$"];

/// Represents an amount of money.
///
/// Arithmetic is exact; rounding to two places only happens when the amount is displayed.
/// The `Display` form is always two decimal places grouped in thousands with commas, independent
/// of locale, and without a currency symbol. Use `Amount::with_symbol` for a prefixed form.
///
/// # Examples
///
/// Parsing with a currency symbol:
/// ```
/// # use invoice_builder::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₦1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "1,250.50");
/// assert_eq!(amount.with_symbol("₦"), "₦1,250.50");
/// ```
///
/// Unparsable text degrades to zero when parsed leniently:
/// ```
/// # use invoice_builder::model::Amount;
/// assert!(Amount::parse_lenient("abc").is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// The value rounded to two decimal places, halves away from zero.
    pub fn rounded(&self) -> Decimal {
        self.value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Parses `s`, treating anything that cannot be parsed as zero.
    pub fn parse_lenient(s: &str) -> Self {
        match Amount::from_str(s) {
            Ok(amount) => amount,
            Err(e) => {
                trace!("Treating unparsable amount '{s}' as zero: {e}");
                Amount::ZERO
            }
        }
    }

    /// Formats the amount with `symbol` placed after the sign, e.g. `-₦60,000.00`.
    pub fn with_symbol(&self, symbol: &str) -> String {
        let (sign, digits) = self.sign_and_digits();
        format!("{sign}{symbol}{digits}")
    }

    fn sign_and_digits(&self) -> (&'static str, String) {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let plain = format!("{:.2}", rounded.abs());
        let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
        (sign, format!("{}.{fraction}", group_thousands(whole)))
    }
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(whole: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (ix, c) in whole.chars().enumerate() {
        if ix > 0 && (whole.len() - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Error)]
pub enum AmountError {
    #[error(transparent)]
    Decimal(#[from] rust_decimal::Error),

    #[error("'{0}' has more than one sign")]
    ExtraSign(String),
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Remove whitespace
        let trimmed = s.trim();

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // A single sign may come before the currency symbol: "-₦50.00"
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start()),
        };

        // Remove at most one known currency symbol, e.g. "₦", "$" or "NGN ".
        let without_symbol = SYMBOLS
            .iter()
            .find_map(|symbol| unsigned.strip_prefix(symbol))
            .unwrap_or(unsigned)
            .trim_start();
        if without_symbol.starts_with(['-', '+']) {
            return Err(AmountError::ExtraSign(s.to_string()));
        }

        // Remove commas (thousand separators) and any whitespace left between the groups
        let digits: String = without_symbol
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        // Parse the decimal value
        let value = Decimal::from_str(&digits)?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, digits) = self.sign_and_digits();
        write!(f, "{sign}{digits}")
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

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.value + rhs.value)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_naira_sign() {
        let amount = Amount::from_str("₦50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_without_symbol() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_negative_with_symbol() {
        let amount = Amount::from_str("-₦50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
    }

    #[test]
    fn test_parse_code_prefix() {
        let amount = Amount::from_str("NGN 1,000").unwrap();
        assert_eq!(amount.value(), dec("1000"));
    }

    #[test]
    fn test_parse_empty_string() {
        let amount = Amount::from_str("").unwrap();
        assert_eq!(amount.value(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  ₦ 50.00  ").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_multiple_commas() {
        let amount = Amount::from_str("₦1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(Amount::from_str("twenty").is_err());
        assert!(Amount::from_str("12abc").is_err());
    }

    #[test]
    fn test_parse_lenient_garbage_is_zero() {
        assert!(Amount::parse_lenient("twenty").is_zero());
        assert!(Amount::parse_lenient("₦").is_zero());
        assert_eq!(Amount::parse_lenient("₦2,500.25").value(), dec("2500.25"));
    }

    #[test]
    fn test_display_groups_thousands() {
        let amount = Amount::new(dec("1234567.5"));
        assert_eq!(amount.to_string(), "1,234,567.50");
    }

    #[test]
    fn test_display_small_values() {
        assert_eq!(Amount::new(dec("0")).to_string(), "0.00");
        assert_eq!(Amount::new(dec("7")).to_string(), "7.00");
        assert_eq!(Amount::new(dec("999.999")).to_string(), "1,000.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Amount::new(dec("2.345")).to_string(), "2.35");
        assert_eq!(Amount::new(dec("-2.345")).to_string(), "-2.35");
    }

    #[test]
    fn test_display_negative_with_symbol() {
        let amount = Amount::new(dec("-60000"));
        assert_eq!(amount.with_symbol("₦"), "-₦60,000.00");
    }

    #[test]
    fn test_tiny_negative_displays_without_sign() {
        let amount = Amount::new(dec("-0.001"));
        assert_eq!(amount.to_string(), "0.00");
    }

    #[test]
    fn test_parse_rejects_text_around_the_number() {
        for input in ["abc25", "x5", "Tax: 25", "25 naira", "N 25"] {
            assert!(Amount::from_str(input).is_err(), "{input}");
            assert!(Amount::parse_lenient(input).is_zero(), "{input}");
        }
    }

    #[test]
    fn test_parse_rejects_a_second_sign() {
        for input in ["--25", "-₦-25", "+-5", "₦-5", "- -1"] {
            let err = Amount::from_str(input).unwrap_err();
            assert!(matches!(err, AmountError::ExtraSign(_)), "{input}: {err}");
            assert!(Amount::parse_lenient(input).is_zero(), "{input}");
        }
        assert_eq!(Amount::from_str("+25").unwrap().value(), dec("25"));
    }

    #[test]
    fn test_display_large_values_exactly() {
        let amount = Amount::new(dec("123456789012345.67"));
        assert_eq!(amount.with_symbol("₦"), "₦123,456,789,012,345.67");
        let amount = Amount::new(dec("12345678901234567.89"));
        assert_eq!(amount.to_string(), "12,345,678,901,234,567.89");
        let amount = Amount::new(dec("-1000000000000000.005"));
        assert_eq!(amount.to_string(), "-1,000,000,000,000,000.01");
    }

    #[test]
    fn test_display_groups_at_every_width() {
        assert_eq!(Amount::new(dec("12")).to_string(), "12.00");
        assert_eq!(Amount::new(dec("123")).to_string(), "123.00");
        assert_eq!(Amount::new(dec("1234")).to_string(), "1,234.00");
        assert_eq!(Amount::new(dec("123456")).to_string(), "123,456.00");
        assert_eq!(Amount::new(dec("1234567.1")).to_string(), "1,234,567.10");
    }

    #[test]
    fn test_format_then_parse_recovers_value() {
        for s in [
            "0.01",
            "100",
            "250.5",
            "1234567.89",
            "3.14159",
            "9007199254740993.01",
            "123456789012345.675",
            "98765432109876543210.129",
            "0.0000000001234",
        ] {
            let original = Amount::new(dec(s));
            let reparsed = Amount::parse_lenient(&original.with_symbol("₦"));
            assert_eq!(reparsed.value(), original.rounded(), "{s}");
        }
    }

    #[test]
    fn test_sum() {
        let total: Amount = [dec("100.00"), dec("250.50")]
            .into_iter()
            .map(Amount::new)
            .sum();
        assert_eq!(total.value(), dec("350.50"));
    }

    #[test]
    fn test_serialize() {
        let amount = Amount::new(dec("1050"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1,050.00\"");
    }

    #[test]
    fn test_deserialize_with_symbol() {
        let amount: Amount = serde_json::from_str("\"₦50.00\"").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_is_positive_and_negative() {
        assert!(Amount::from_str("₦50.00").unwrap().is_positive());
        assert!(Amount::from_str("-₦50.00").unwrap().is_negative());
        let zero = Amount::from_str("0.00").unwrap();
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
    }
}
