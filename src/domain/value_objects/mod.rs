//! Value Objects for the storefront

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Product identity as issued by the backend.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self { Self(value) }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

/// Money value object.
///
/// Amounts are denominated in the smallest whole currency unit the backend
/// uses and can never be negative. Arithmetic is checked so a total can
/// never silently wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount < Decimal::ZERO { return Err(MoneyError::Negative(amount)); }
        Ok(Self(amount))
    }

    pub fn from_minor(units: u64) -> Self { Self(Decimal::from(units)) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }

    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.0.checked_add(other.0).map(Self).ok_or(MoneyError::Overflow)
    }

    pub fn multiply(self, qty: Quantity) -> Result<Money, MoneyError> {
        self.0.checked_mul(Decimal::from(qty.value())).map(Self).ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.normalize()) }
}

impl std::str::FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.trim().parse::<Decimal>().map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Money::new(amount)
    }
}

// Integral amounts go out as JSON integers so the backend sees the same
// shape it sends.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero() {
            if let Some(units) = self.0.to_i64() {
                return serializer.serialize_i64(units);
            }
        }
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::new(amount).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("amount {0} is negative")]
    Negative(Decimal),
    #[error("amount overflowed")]
    Overflow,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
}

/// Quantity of a single line; always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Option<Self> { (value > 0).then_some(Self(value)) }

    /// Interprets a user-requested quantity. Anything at or below zero means
    /// "no line at all" and yields `None`.
    pub fn from_requested(requested: i64) -> Option<Self> {
        if requested <= 0 { return None; }
        Some(Self(u32::try_from(requested).unwrap_or(u32::MAX)))
    }

    pub fn value(self) -> u32 { self.0 }
    pub fn increment(self) -> Self { Self(self.0.saturating_add(1)) }
}

impl TryFrom<u32> for Quantity {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quantity::new(value).ok_or_else(|| "quantity must be at least 1".to_string())
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self { value.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
