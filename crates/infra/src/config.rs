//! Billing configuration, read from the environment.

use std::str::FromStr;

use anyhow::{Context, bail};
use rust_decimal::Decimal;

use memberbill_core::RoundingIncrement;

/// ISO currency code of invoice amounts (default `CHF`).
pub const CURRENCY_VAR: &str = "MEMBERBILL_CURRENCY";

/// Step invoice totals are rounded to (default `0.01`; `0.05` for cash rounding).
pub const TOTAL_ROUNDING_VAR: &str = "MEMBERBILL_TOTAL_ROUNDING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingConfig {
    pub currency: String,
    pub total_rounding: RoundingIncrement,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: "CHF".to_string(),
            total_rounding: RoundingIncrement::cents(),
        }
    }
}

impl BillingConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(currency) = read(CURRENCY_VAR) {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
                bail!("{CURRENCY_VAR} must be a three-letter ISO code, got '{currency}'");
            }
            config.currency = currency;
        }

        if let Some(raw) = read(TOTAL_ROUNDING_VAR) {
            let step = Decimal::from_str(&raw)
                .with_context(|| format!("{TOTAL_ROUNDING_VAR} is not a decimal: '{raw}'"))?;
            config.total_rounding = RoundingIncrement::new(step)
                .with_context(|| format!("invalid {TOTAL_ROUNDING_VAR}"))?;
        }

        Ok(config)
    }
}
