use serde::{Deserialize, Serialize};

use memberbill_core::{AggregateId, DomainError, DomainResult, Entity, Money};

use crate::invoice::InvoiceId;
use crate::variant::{CostParameters, LineItemKind};
use crate::vat::VatRate;

/// Line item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub AggregateId);

impl LineItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One billable row of an invoice.
///
/// `cost` is a cache of [`LineItem::calculated_cost`]. It is only written by
/// [`LineItem::recalculate`]; readers that need a cost use
/// [`LineItem::effective_cost`] or [`LineItem::total`], which fall back to a
/// fresh calculation without storing it.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    id: LineItemId,
    invoice_id: InvoiceId,
    kind: LineItemKind,
    pub name: String,
    pub description: Option<String>,
    /// Booking account reference (free text).
    pub account: Option<String>,
    pub cost_center: Option<String>,
    pub unit_cost: Option<Money>,
    pub count: Option<u32>,
    pub vat_rate: Option<VatRate>,
    pub dynamic_cost_parameters: CostParameters,
    cost: Option<Money>,
}

impl LineItem {
    /// New line item of `kind` attached to `invoice_id`, with a count of 1.
    pub fn new(invoice_id: InvoiceId, kind: LineItemKind, name: impl Into<String>) -> Self {
        Self {
            id: LineItemId::new(AggregateId::new()),
            invoice_id,
            kind,
            name: name.into(),
            description: None,
            account: None,
            cost_center: None,
            unit_cost: None,
            count: Some(1),
            vat_rate: None,
            dynamic_cost_parameters: CostParameters::new(),
            cost: None,
        }
    }

    pub fn with_id(mut self, id: LineItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: Money) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_vat_rate(mut self, vat_rate: VatRate) -> Self {
        self.vat_rate = Some(vat_rate);
        self
    }

    /// Set dynamic cost parameters, keeping only the keys the variant declares.
    pub fn with_parameters(mut self, parameters: &CostParameters) -> Self {
        self.dynamic_cost_parameters = self.permitted_parameters(parameters);
        self
    }

    pub fn id_typed(&self) -> LineItemId {
        self.id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn kind(&self) -> &LineItemKind {
        &self.kind
    }

    pub fn discriminator(&self) -> &'static str {
        self.kind.discriminator()
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind.is_dynamic()
    }

    /// Cached cost, `None` until [`LineItem::recalculate`] has run.
    pub fn cost(&self) -> Option<Money> {
        self.cost
    }

    /// `parameters` filtered down to the keys this item's variant declares.
    pub fn permitted_parameters(&self, parameters: &CostParameters) -> CostParameters {
        parameters.restricted_to(self.kind.parameter_keys())
    }

    /// Cost derived from the current fields.
    ///
    /// Dynamic variants delegate to their cost function. Static items cost
    /// `unit_cost × count`; a missing unit cost or count yields zero.
    pub fn calculated_cost(&self) -> Money {
        match &self.kind {
            LineItemKind::Dynamic(variant) => variant.compute_cost(&self.dynamic_cost_parameters),
            LineItemKind::Static => match (self.unit_cost, self.count) {
                (Some(unit_cost), Some(count)) => unit_cost.times(count),
                _ => Money::ZERO,
            },
        }
    }

    /// Refresh the cached cost. Does not persist.
    pub fn recalculate(&mut self) -> &mut Self {
        self.cost = Some(self.calculated_cost());
        self
    }

    /// The cached cost, or a fresh calculation if nothing is cached.
    pub fn effective_cost(&self) -> Money {
        self.cost.unwrap_or_else(|| self.calculated_cost())
    }

    /// Tax on the cached cost; zero without a VAT rate or without a cached cost.
    pub fn vat(&self) -> Money {
        self.vat_on(self.cost.unwrap_or(Money::ZERO))
    }

    /// Cost plus VAT.
    pub fn total(&self) -> Money {
        let cost = self.effective_cost();
        cost + self.vat_on(cost)
    }

    pub(crate) fn vat_on(&self, cost: Money) -> Money {
        self.vat_rate
            .map(|rate| rate.tax_on(cost))
            .unwrap_or(Money::ZERO)
    }

    /// Check the fields required to persist this item.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name must be present"));
        }

        if let Some(unit_cost) = self.unit_cost {
            unit_cost.validate_storable("unit_cost")?;
        }
        if let Some(vat_rate) = self.vat_rate {
            vat_rate.validate()?;
        }
        if self.count == Some(0) {
            return Err(DomainError::validation("count must be positive"));
        }

        if !self.is_dynamic() {
            if self.unit_cost.is_none() {
                return Err(DomainError::validation("unit_cost must be present"));
            }
            if self.count.is_none() {
                return Err(DomainError::validation("count must be present"));
            }
        }

        Ok(())
    }

    /// Check that the cached cost, and the total derived from it, fit a money column.
    ///
    /// Dynamic costs may carry more than two decimal places or be negative;
    /// only their size is bounded.
    pub fn validate_cost(&self) -> DomainResult<()> {
        if let Some(cost) = self.cost {
            cost.validate_magnitude("cost")?;
            (cost + self.vat_on(cost)).validate_magnitude("total")?;
        }
        Ok(())
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for LineItem {
    /// `"<name>: <total> (<cost> / <vat>)"`
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let cost = self.effective_cost();
        write!(
            f,
            "{}: {} ({} / {})",
            self.name,
            self.total(),
            cost,
            self.vat_on(cost)
        )
    }
}
