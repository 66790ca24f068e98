//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. On the wire an amount is a plain
//! JSON number (e.g. `199.5`), in the SQLite store it is the canonical decimal text, and in memory
//! all arithmetic is exact.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents an amount of money.
///
/// No sign or precision rules are enforced, an amount is whatever number the caller submitted as
/// long as it fits in a `Decimal` (magnitude up to 79,228,162,514,264,337,593,543,950,335).
/// Arithmetic is checked: a sum that leaves that range is an `AmountOverflow`, never a panic.
///
/// # Examples
///
/// ```
/// # use account_book::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("1500").unwrap();
/// let b = Amount::from_str("199.5").unwrap();
/// assert_eq!(a.try_sub(b).unwrap().to_string(), "1300.5");
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

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self + rhs`, or an error if the result leaves the representable range.
    pub fn try_add(self, rhs: Amount) -> Result<Amount, AmountOverflow> {
        self.0.checked_add(rhs.0).map(Amount).ok_or(AmountOverflow)
    }

    /// `self - rhs`, or an error if the result leaves the representable range.
    pub fn try_sub(self, rhs: Amount) -> Result<Amount, AmountOverflow> {
        self.0.checked_sub(rhs.0).map(Amount).ok_or(AmountOverflow)
    }

    /// The exact sum of `amounts`, zero when empty.
    pub fn try_sum<I>(amounts: I) -> Result<Amount, AmountOverflow>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts.into_iter().try_fold(Amount::ZERO, Amount::try_add)
    }

    /// Formats the amount with two decimal places and thousands separators, e.g. `-1,234.50`.
    pub fn pretty(&self) -> String {
        format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(String);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount: {}", self.0)
    }
}

impl std::error::Error for AmountError {}

/// The result of adding or subtracting amounts does not fit in the `Decimal` range.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AmountOverflow;

impl Display for AmountOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "the result exceeds the largest supported amount, ±{}", Decimal::MAX)
    }
}

impl std::error::Error for AmountOverflow {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError("an empty string is not a number".into()));
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Amount)
            .map_err(|e| AmountError(format!("'{trimmed}': {e}")))
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Decimal::from_f64(value)
            .map(Amount)
            .ok_or_else(|| {
                AmountError(format!(
                    "{value} is outside the supported range of ±{}",
                    Decimal::MAX
                ))
            })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.normalize(), f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Integral amounts are written without a fractional part, e.g. `1500` not `1500.0`.
        let normalized = self.0.normalize();
        if normalized.scale() == 0 {
            if let Some(i) = normalized.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        serializer.serialize_f64(normalized.to_f64().unwrap_or_default())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Amount::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
