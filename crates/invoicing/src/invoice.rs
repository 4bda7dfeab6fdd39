use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memberbill_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Money, RoundingIncrement};

use crate::line_item::LineItem;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sums over an invoice's line items, each rounded to the rounding increment.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub cost: Money,
    pub vat: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Totals of `items`.
    ///
    /// Items without a cached cost contribute their freshly calculated cost.
    pub fn of_items(items: &[LineItem], rounding: RoundingIncrement) -> Self {
        let mut cost = Money::ZERO;
        let mut vat = Money::ZERO;
        for item in items {
            let item_cost = item.effective_cost();
            cost += item_cost;
            vat += item.vat_on(item_cost);
        }

        Self {
            cost: rounding.apply(cost),
            vat: rounding.apply(vat),
            total: rounding.apply(cost + vat),
        }
    }
}

/// Aggregate root: Invoice.
///
/// Only the part of the invoice that line items feed into is modeled here:
/// its totals. The totals are recomputed from the current line items every
/// time one of them is saved or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    title: String,
    totals: InvoiceTotals,
    recalculated_at: Option<DateTime<Utc>>,
    version: u64,
}

impl Invoice {
    pub fn new(id: InvoiceId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            totals: InvoiceTotals::default(),
            recalculated_at: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn total(&self) -> Money {
        self.totals.total
    }

    pub fn recalculated_at(&self) -> Option<DateTime<Utc>> {
        self.recalculated_at
    }

    /// Copy stamped with the version a store assigned on write.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Recompute totals from `items`, which must be this invoice's complete set.
    pub fn recalculate(
        &mut self,
        items: &[LineItem],
        rounding: RoundingIncrement,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(stray) = items.iter().find(|item| item.invoice_id() != self.id) {
            return Err(DomainError::invariant(format!(
                "line item {} belongs to invoice {}, not {}",
                stray.id_typed(),
                stray.invoice_id(),
                self.id
            )));
        }

        self.totals = InvoiceTotals::of_items(items, rounding);
        self.recalculated_at = Some(at);
        Ok(())
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
