//! Money types
//!
//! Domain primitives for monetary values in integer minor units (cents).
//! All values are validated at construction time, ensuring invalid values
//! cannot exist in the system. The wire format transports decimal numbers;
//! conversion in either direction is exact or it fails.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places carried on the wire (minor units are cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Minor units per major currency unit.
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Amount represents a validated transaction amount in minor units.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Wire decimals carry at most 2 decimal places
///
/// # Example
/// ```
/// use ledgerd::domain::Amount;
///
/// let amount = Amount::new(10_000).unwrap();
/// assert_eq!(amount.minor_units(), 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

/// Errors that can occur when creating or combining money values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Amount has too many decimal places (max {MINOR_UNIT_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds the representable range")]
    Overflow,

    #[error("Balance would become negative: required {required}, available {available}")]
    Negative { required: i64, available: i64 },
}

impl Amount {
    /// Create a new Amount from minor units with validation.
    ///
    /// # Errors
    /// - `MoneyError::NotPositive` if value <= 0
    pub fn new(minor_units: i64) -> Result<Self, MoneyError> {
        if minor_units <= 0 {
            return Err(MoneyError::NotPositive(minor_units));
        }
        Ok(Self(minor_units))
    }

    /// Convert a wire decimal into minor units, exactly.
    ///
    /// # Errors
    /// - `MoneyError::TooManyDecimals` if the value carries sub-cent precision
    /// - `MoneyError::NotPositive` if value <= 0
    /// - `MoneyError::Overflow` if the value does not fit in i64 minor units
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let value = value.normalize();
        if value.scale() > MINOR_UNIT_SCALE {
            return Err(MoneyError::TooManyDecimals(value.scale()));
        }

        let minor = value
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .and_then(|v| v.to_i64())
            .ok_or(MoneyError::Overflow)?;

        Self::new(minor)
    }

    /// Get the value in minor units.
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Render the amount as a wire decimal (major units, 2 decimal places).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Balance represents an account balance in minor units.
/// Unlike Amount, Balance can be zero; it can never be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive).
    pub fn new(minor_units: i64) -> Result<Self, MoneyError> {
        if minor_units < 0 {
            return Err(MoneyError::NotPositive(minor_units));
        }
        Ok(Self(minor_units))
    }

    /// Create a zero balance.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the value in minor units.
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Render the balance as a wire decimal.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Check if the balance covers a withdrawal of `amount`.
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.minor_units()
    }

    /// Add an amount to the balance.
    pub fn credit(&self, amount: &Amount) -> Result<Balance, MoneyError> {
        let new_value = self
            .0
            .checked_add(amount.minor_units())
            .ok_or(MoneyError::Overflow)?;
        Balance::new(new_value)
    }

    /// Subtract an amount from the balance.
    ///
    /// # Errors
    /// - `MoneyError::Negative` if the result would drop below zero
    pub fn debit(&self, amount: &Amount) -> Result<Balance, MoneyError> {
        if !self.is_sufficient_for(amount) {
            return Err(MoneyError::Negative {
                required: amount.minor_units(),
                available: self.0,
            });
        }
        Balance::new(self.0 - amount.minor_units())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}
