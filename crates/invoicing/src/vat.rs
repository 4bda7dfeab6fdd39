//! Value-added-tax rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use memberbill_core::{DomainError, DomainResult, Money, ValueObject};

/// Decimal places a VAT rate may carry (`decimal(5, 2)`).
const VAT_RATE_SCALE: u32 = 2;

/// VAT rate as a percentage on the 0–100 scale (7.7 means 7.7 %).
///
/// Construction is unchecked so a rate can be edited like any other field;
/// [`VatRate::validate`] runs when the owning line item is persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl ValueObject for VatRate {}

impl VatRate {
    pub fn new(percent: Decimal) -> Self {
        Self(percent)
    }

    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// Tax on `cost`: `cost × (rate / 100)`, unrounded.
    pub fn tax_on(&self, cost: Money) -> Money {
        cost.percentage(self.0)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.0 < Decimal::ZERO || self.0 > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(format!(
                "vat_rate must be between 0 and 100, got {}",
                self.0
            )));
        }
        if self.0.normalize().scale() > VAT_RATE_SCALE {
            return Err(DomainError::validation(format!(
                "vat_rate must have at most {VAT_RATE_SCALE} decimal places"
            )));
        }
        Ok(())
    }
}

impl From<Decimal> for VatRate {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for VatRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
