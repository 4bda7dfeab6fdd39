//! Monetary amounts.
//!
//! All amounts are [`rust_decimal::Decimal`], never floating point. Products
//! keep the full precision of their inputs; rounding is an explicit step
//! ([`RoundingIncrement::apply`]) performed where a stored sum is produced.
//!
//! Arithmetic saturates at the bounds of `Decimal` instead of panicking.
//! A saturated amount is never storable, so [`Money::validate_storable`] and
//! [`Money::validate_magnitude`] turn it into a validation error.

use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Decimal places a persisted amount may carry (`decimal(12, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Integer digits a persisted amount may carry (`decimal(12, 2)`).
const MONEY_INTEGER_DIGITS: u32 = 10;

/// A monetary amount in the invoice currency.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self × quantity`, exact within `Decimal` range.
    pub fn times(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// `self × (percent / 100)`, exact within `Decimal` range.
    pub fn percentage(self, percent: Decimal) -> Money {
        Money(self.0.saturating_mul(percent / Decimal::ONE_HUNDRED))
    }

    /// Check that the amount can be stored as a money column.
    ///
    /// Amounts must be non-negative, carry at most two decimal places and fit
    /// ten integer digits.
    pub fn validate_storable(&self, field: &str) -> DomainResult<()> {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            return Err(DomainError::validation(format!("{field} must not be negative")));
        }
        if self.0.normalize().scale() > MONEY_SCALE {
            return Err(DomainError::validation(format!(
                "{field} must have at most {MONEY_SCALE} decimal places"
            )));
        }
        self.validate_magnitude(field)
    }

    /// Check that the integer part fits a money column, whatever the sign or scale.
    pub fn validate_magnitude(&self, field: &str) -> DomainResult<()> {
        if self.0.trunc().abs() >= Decimal::from(10_i64.pow(MONEY_INTEGER_DIGITS)) {
            return Err(DomainError::validation(format!("{field} is too large")));
        }
        Ok(())
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    /// At least two decimal places, more only when the amount carries them.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let amount = self.0.normalize();
        if amount.scale() < MONEY_SCALE {
            write!(f, "{:.2}", amount)
        } else {
            write!(f, "{}", amount)
        }
    }
}

/// Step to which stored sums are rounded (0.01, or 0.05 for cash rounding).
///
/// Steps are positive and carry at most two decimal places, so the finest
/// step is one cent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct RoundingIncrement(Decimal);

impl ValueObject for RoundingIncrement {}

impl RoundingIncrement {
    pub fn new(step: Decimal) -> DomainResult<Self> {
        if step <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "rounding increment must be positive, got {step}"
            )));
        }
        if step.normalize().scale() > MONEY_SCALE {
            return Err(DomainError::validation(format!(
                "rounding increment must have at most {MONEY_SCALE} decimal places, got {step}"
            )));
        }
        Ok(Self(step))
    }

    /// Round to whole cents.
    pub fn cents() -> Self {
        Self(Decimal::new(1, MONEY_SCALE))
    }

    pub fn step(&self) -> Decimal {
        self.0
    }

    /// Round `money` to the nearest multiple of the step, halves away from zero.
    ///
    /// Amounts too large to divide by the step are returned unchanged.
    pub fn apply(&self, money: Money) -> Money {
        match money.0.checked_div(self.0) {
            Some(steps) => {
                let steps = steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                Money(steps.saturating_mul(self.0))
            }
            None => money,
        }
    }
}

impl Default for RoundingIncrement {
    fn default() -> Self {
        Self::cents()
    }
}

impl TryFrom<Decimal> for RoundingIncrement {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoundingIncrement> for Decimal {
    fn from(value: RoundingIncrement) -> Self {
        value.0
    }
}
