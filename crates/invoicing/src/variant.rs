//! Line-item variants and the discriminator registry.
//!
//! A variant decides how a line item's cost is computed. The base variant
//! (`"InvoiceItem"`) is static: `unit_cost × count`. Dynamic variants plug in a
//! [`DynamicCost`] implementation that computes the cost from named
//! parameters and declares which parameter keys it accepts.
//!
//! The registry maps discriminator strings to variants. It is populated once
//! at startup and then shared read-only.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use memberbill_core::{DomainError, DomainResult, Money};

/// Discriminator of the built-in static variant.
pub const BASE_DISCRIMINATOR: &str = "InvoiceItem";

/// Named inputs of a dynamic cost function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostParameters(BTreeMap<String, JsonValue>);

impl CostParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Read a parameter as a decimal.
    ///
    /// Accepts JSON numbers and numeric strings (form input arrives as text);
    /// anything else reads as absent.
    pub fn decimal(&self, key: &str) -> Option<Decimal> {
        match self.0.get(key)? {
            JsonValue::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok(),
            JsonValue::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the given keys.
    pub fn restricted_to(&self, keys: &[&str]) -> CostParameters {
        CostParameters(
            self.0
                .iter()
                .filter(|(k, _)| keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for CostParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        CostParameters(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Capability of a dynamic line-item variant.
pub trait DynamicCost: Send + Sync {
    /// Discriminator stored with every line item of this variant.
    fn discriminator(&self) -> &'static str;

    /// Parameter keys this variant reads; other keys are dropped on input.
    fn parameter_keys(&self) -> &'static [&'static str];

    /// Cost of one line item given its parameters.
    fn compute_cost(&self, parameters: &CostParameters) -> Money;
}

/// The variant of a line item.
#[derive(Clone)]
pub enum LineItemKind {
    /// `unit_cost × count`.
    Static,
    /// Cost computed by a registered [`DynamicCost`].
    Dynamic(Arc<dyn DynamicCost>),
}

impl LineItemKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            LineItemKind::Static => BASE_DISCRIMINATOR,
            LineItemKind::Dynamic(variant) => variant.discriminator(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, LineItemKind::Dynamic(_))
    }

    pub fn parameter_keys(&self) -> &'static [&'static str] {
        match self {
            LineItemKind::Static => &[],
            LineItemKind::Dynamic(variant) => variant.parameter_keys(),
        }
    }
}

impl PartialEq for LineItemKind {
    fn eq(&self, other: &Self) -> bool {
        self.discriminator() == other.discriminator()
    }
}

impl Eq for LineItemKind {}

impl core::fmt::Debug for LineItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineItemKind::Static => f.write_str("Static"),
            LineItemKind::Dynamic(variant) => f
                .debug_tuple("Dynamic")
                .field(&variant.discriminator())
                .finish(),
        }
    }
}

/// Discriminator → variant lookup.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    variants: BTreeMap<&'static str, LineItemKind>,
}

impl VariantRegistry {
    /// Registry holding only the static base variant.
    pub fn new() -> Self {
        let mut variants = BTreeMap::new();
        variants.insert(BASE_DISCRIMINATOR, LineItemKind::Static);
        Self { variants }
    }

    pub fn register(&mut self, variant: Arc<dyn DynamicCost>) -> DomainResult<()> {
        let discriminator = variant.discriminator();
        if self.variants.contains_key(discriminator) {
            return Err(DomainError::conflict(format!(
                "invoice_item type '{discriminator}' is already registered"
            )));
        }
        tracing::debug!(discriminator, "invoice item variant registered");
        self.variants
            .insert(discriminator, LineItemKind::Dynamic(variant));
        Ok(())
    }

    /// Builder form of [`VariantRegistry::register`].
    pub fn with(mut self, variant: Arc<dyn DynamicCost>) -> DomainResult<Self> {
        self.register(variant)?;
        Ok(self)
    }

    /// Resolve a discriminator to its variant.
    pub fn find(&self, discriminator: &str) -> DomainResult<LineItemKind> {
        self.variants.get(discriminator).cloned().ok_or_else(|| {
            DomainError::not_found(format!("No invoice_item type '{discriminator}' found"))
        })
    }

    /// All known discriminators: the base type first, then registered variants.
    pub fn all_types(&self) -> Vec<&'static str> {
        let mut types = vec![BASE_DISCRIMINATOR];
        types.extend(
            self.variants
                .keys()
                .copied()
                .filter(|d| *d != BASE_DISCRIMINATOR),
        );
        types
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}
