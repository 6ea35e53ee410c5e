//! Money amounts with exactly two decimal places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places carried by every amount.
pub const SCALE: u32 = 2;

/// Largest magnitude a `NUMERIC(10, 2)` column can hold, in cents.
const MAX_CENTS: i64 = 9_999_999_999;

/// Errors raised when building a [`Money`] value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount has more than two significant decimal places.
    #[error("amount {0} has more than two decimal places")]
    TooPrecise(Decimal),

    /// The amount does not fit in ten digits.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),

    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// A monetary amount in the platform currency, stored with two decimals.
///
/// Equality is numeric: `10.0` and `10.00` are the same amount. Deserializes
/// from JSON numbers or strings; serializes as a string (`"10.00"`) so no
/// precision is lost on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Creates an amount from a count of cents (`1000` = `10.00`).
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, SCALE))
    }

    /// The largest amount that can be stored, `99999999.99`.
    pub fn max() -> Self {
        Self::from_cents(MAX_CENTS)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Returns the underlying decimal.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > SCALE {
            return Err(MoneyError::TooPrecise(value));
        }
        if value.abs() > Decimal::new(MAX_CENTS, SCALE) {
            return Err(MoneyError::OutOfRange(value));
        }
        let mut value = value;
        value.rescale(SCALE);
        Ok(Self(value))
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<Decimal>()
            .map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Self::try_from(value)
    }
}
