//! Amount type for handling monetary values.
//!
//! Amounts are held as exact decimals so that sums and comparisons against budgets never drift.
//! On the wire they are plain JSON numbers, which is what the browser client sends. Parsing from
//! text also accepts a leading rupee sign and comma thousands separators, e.g. `₹1,250.50`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The currency symbol used when displaying amounts.
pub const CURRENCY: &str = "₹";

/// Represents an amount of money.
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "₹1,250.50");
/// assert_eq!(amount.plain(), "1250.5");
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

    /// Adds `other`, clamping at the largest representable amount instead of overflowing.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// `self` as a percentage of `whole`. `None` when `whole` is zero or the result is out of
    /// range.
    pub fn percent_of(&self, whole: Amount) -> Option<Decimal> {
        self.0
            .checked_div(whole.0)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Whether the amount reads back unchanged after being written as a JSON number.
    pub fn is_representable(&self) -> bool {
        if self.0.fract().is_zero() && self.0.to_i64().is_some() {
            return true;
        }
        self.0
            .to_f64()
            .filter(|f| f.is_finite())
            .and_then(|f| Decimal::from_str(&f.to_string()).ok())
            .is_some_and(|d| d == self.0)
    }

    /// The amount without currency symbol, separators or trailing zeros, e.g. `12.5` or `100`.
    pub fn plain(&self) -> String {
        self.0.normalize().to_string()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let without_symbol = unsigned.strip_prefix(CURRENCY).unwrap_or(unsigned);
        let without_commas = without_symbol.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.abs().round_dp(2).to_f64().unwrap_or_default();
        write!(f, "{sign}{CURRENCY}{}", format_num::format_num!(",.2", num))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Whole amounts go out as integers so that `100` round-trips as `100`, not `100.0`.
        if self.0.fract().is_zero() {
            if let Some(i) = self.0.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        match self.0.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => Err(serde::ser::Error::custom(format!(
                "amount {} cannot be represented as a number",
                self.0
            ))),
        }
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a number or a numeric string")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        // Going through the shortest display form keeps `12.1` as `12.1` instead of the
        // binary approximation.
        Decimal::from_str(&v.to_string())
            .map(Amount)
            .map_err(|e| E::custom(format!("amount {v} is out of range: {e}")))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
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

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}
