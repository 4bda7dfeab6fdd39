//! Line item use cases: build, save, delete, list.
//!
//! Saving and deleting are two-level: the line item row is written first,
//! then a [`LineItemEvent`] is published and every subscriber (normally
//! [`crate::InvoiceRecalculation`]) runs before the call returns. A failing
//! subscriber surfaces as the caller's error; the line item write is not
//! rolled back, that is the datastore's transaction to own.
//!
//! A line item saved under a different invoice than the stored row moves:
//! the previous invoice is recalculated as if the item had been removed.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use memberbill_core::{DomainError, DomainResult};
use memberbill_events::EventDispatcher;

use crate::events::{LINE_ITEM_AGGREGATE_TYPE, LineItemEvent, LineItemRemoved, LineItemSaved};
use crate::invoice::InvoiceId;
use crate::line_item::{LineItem, LineItemId};
use crate::ports::LineItemStore;
use crate::variant::{LineItemKind, VariantRegistry};

pub struct LineItemService<S> {
    store: S,
    registry: Arc<VariantRegistry>,
    events: Arc<EventDispatcher<LineItemEvent>>,
}

impl<S> LineItemService<S>
where
    S: LineItemStore,
{
    pub fn new(
        store: S,
        registry: Arc<VariantRegistry>,
        events: Arc<EventDispatcher<LineItemEvent>>,
    ) -> Self {
        Self {
            store,
            registry,
            events,
        }
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Resolve a variant by discriminator.
    pub fn find_variant(&self, discriminator: &str) -> DomainResult<LineItemKind> {
        self.registry.find(discriminator)
    }

    /// Unsaved line item of the named variant.
    pub fn build(
        &self,
        invoice_id: InvoiceId,
        discriminator: &str,
        name: impl Into<String>,
    ) -> DomainResult<LineItem> {
        let kind = self.find_variant(discriminator)?;
        Ok(LineItem::new(invoice_id, kind, name))
    }

    pub fn get(&self, id: LineItemId) -> DomainResult<LineItem> {
        self.store
            .get(id)?
            .ok_or_else(|| DomainError::not_found(format!("line item {id}")))
    }

    /// Line items of an invoice, ordered by name.
    pub fn list(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>> {
        self.store.list_for_invoice(invoice_id)
    }

    /// Recalculate `item`, persist it, then have its invoice recalculated.
    ///
    /// Fails with `Validation` before anything is written if the item is
    /// incomplete or malformed, or if its cost does not fit a money column.
    pub fn recalculate_and_persist(&self, item: &mut LineItem) -> DomainResult<()> {
        item.validate()?;
        item.recalculate();
        item.validate_cost()?;

        let previous = self.store.get(item.id_typed())?;
        self.store.save(item.clone())?;
        debug!(
            line_item_id = %item.id_typed(),
            invoice_id = %item.invoice_id(),
            discriminator = item.discriminator(),
            "line item saved"
        );

        if let Some(previous) = previous.filter(|p| p.invoice_id() != item.invoice_id()) {
            info!(
                line_item_id = %item.id_typed(),
                from = %previous.invoice_id(),
                to = %item.invoice_id(),
                "line item moved to another invoice"
            );
            let event = LineItemEvent::LineItemRemoved(LineItemRemoved {
                line_item_id: item.id_typed(),
                invoice_id: previous.invoice_id(),
                name: previous.name,
                occurred_at: Utc::now(),
            });
            self.events
                .publish(item.id_typed().0, LINE_ITEM_AGGREGATE_TYPE, event)?;
        }

        let event = LineItemEvent::LineItemSaved(LineItemSaved {
            line_item_id: item.id_typed(),
            invoice_id: item.invoice_id(),
            cost: item.effective_cost(),
            total: item.total(),
            occurred_at: Utc::now(),
        });
        self.events
            .publish(item.id_typed().0, LINE_ITEM_AGGREGATE_TYPE, event)?;
        Ok(())
    }

    /// Delete a line item, then have its invoice recalculated without it.
    pub fn delete(&self, id: LineItemId) -> DomainResult<LineItem> {
        let removed = self
            .store
            .delete(id)?
            .ok_or_else(|| DomainError::not_found(format!("line item {id}")))?;
        info!(
            line_item_id = %id,
            invoice_id = %removed.invoice_id(),
            name = %removed.name,
            "line item deleted"
        );

        let event = LineItemEvent::LineItemRemoved(LineItemRemoved {
            line_item_id: id,
            invoice_id: removed.invoice_id(),
            name: removed.name.clone(),
            occurred_at: Utc::now(),
        });
        self.events.publish(id.0, LINE_ITEM_AGGREGATE_TYPE, event)?;
        Ok(removed)
    }

    /// Variants referenced by stored line items.
    ///
    /// Fails with `NotFound` if storage holds a discriminator that is not
    /// registered, which would make those rows uncomputable.
    pub fn stored_variants(&self) -> DomainResult<Vec<LineItemKind>> {
        let discriminators: BTreeSet<String> = self.store.discriminators()?.into_iter().collect();
        discriminators
            .iter()
            .map(|d| self.registry.find(d))
            .collect()
    }
}

impl<S> core::fmt::Debug for LineItemService<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineItemService")
            .field("variants", &self.registry.all_types())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
