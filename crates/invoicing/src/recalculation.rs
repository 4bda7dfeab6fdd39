//! Keeps invoice totals in step with their line items.

use tracing::info;

use memberbill_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, RoundingIncrement};
use memberbill_events::{Event, EventEnvelope, EventHandler};

use crate::events::LineItemEvent;
use crate::ports::{InvoiceStore, LineItemStore};

/// Subscriber that recomputes and persists the owning invoice whenever one of
/// its line items is saved or removed.
///
/// The invoice is rebuilt from the full, current set of line items, so
/// handling the same event twice leaves the same totals.
#[derive(Debug)]
pub struct InvoiceRecalculation<L, I> {
    line_items: L,
    invoices: I,
    rounding: RoundingIncrement,
}

impl<L, I> InvoiceRecalculation<L, I>
where
    L: LineItemStore,
    I: InvoiceStore,
{
    pub fn new(line_items: L, invoices: I, rounding: RoundingIncrement) -> Self {
        Self {
            line_items,
            invoices,
            rounding,
        }
    }
}

impl<L, I> EventHandler<LineItemEvent> for InvoiceRecalculation<L, I>
where
    L: LineItemStore,
    I: InvoiceStore,
{
    fn name(&self) -> &'static str {
        "invoice_recalculation"
    }

    fn handle(&self, envelope: &EventEnvelope<LineItemEvent>) -> DomainResult<()> {
        let event = envelope.payload();
        let invoice_id = event.invoice_id();

        let mut invoice = self
            .invoices
            .get(invoice_id)?
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")))?;
        let expected = ExpectedVersion::Exact(invoice.version());

        let items = self.line_items.list_for_invoice(invoice_id)?;
        invoice.recalculate(&items, self.rounding, event.occurred_at())?;
        let saved = self.invoices.save(invoice, expected)?;

        info!(
            %invoice_id,
            trigger = event.event_type(),
            line_items = items.len(),
            total = %saved.total(),
            version = saved.version(),
            "invoice recalculated"
        );
        Ok(())
    }
}
