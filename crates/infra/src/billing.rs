//! Wiring of stores, variant registry and the invoice recalculation subscriber.

use std::sync::Arc;

use tracing::info;

use memberbill_core::{AggregateId, DomainError, DomainResult, ExpectedVersion};
use memberbill_events::EventDispatcher;
use memberbill_invoicing::{
    Invoice, InvoiceId, InvoiceRecalculation, InvoiceStore, LineItemEvent, LineItemService,
    VariantRegistry,
};

use crate::config::BillingConfig;
use crate::store::{InMemoryInvoiceStore, InMemoryLineItemStore};

/// A ready-to-use billing context backed by in-memory stores.
///
/// Every line item saved or deleted through [`Billing::line_items`] has its
/// invoice recalculated and persisted before the call returns.
#[derive(Debug)]
pub struct Billing {
    config: BillingConfig,
    invoices: Arc<InMemoryInvoiceStore>,
    line_items: LineItemService<Arc<InMemoryLineItemStore>>,
}

impl Billing {
    pub fn in_memory(config: BillingConfig, registry: VariantRegistry) -> Self {
        let line_item_store = Arc::new(InMemoryLineItemStore::new());
        let invoices = Arc::new(InMemoryInvoiceStore::new());

        let events: Arc<EventDispatcher<LineItemEvent>> = Arc::new(EventDispatcher::new());
        events.subscribe(Arc::new(InvoiceRecalculation::new(
            line_item_store.clone(),
            invoices.clone(),
            config.total_rounding,
        )));

        info!(
            currency = %config.currency,
            total_rounding = %config.total_rounding.step(),
            variants = ?registry.all_types(),
            "billing initialized"
        );

        let line_items = LineItemService::new(line_item_store, Arc::new(registry), events);
        Self {
            config,
            invoices,
            line_items,
        }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn line_items(&self) -> &LineItemService<Arc<InMemoryLineItemStore>> {
        &self.line_items
    }

    /// Create and persist an empty invoice.
    pub fn open_invoice(&self, title: impl Into<String>) -> DomainResult<Invoice> {
        let invoice = Invoice::new(InvoiceId::new(AggregateId::new()), title);
        self.invoices.save(invoice, ExpectedVersion::Exact(0))
    }

    pub fn invoice(&self, id: InvoiceId) -> DomainResult<Invoice> {
        self.invoices
            .get(id)?
            .ok_or_else(|| DomainError::not_found(format!("invoice {id}")))
    }
}
