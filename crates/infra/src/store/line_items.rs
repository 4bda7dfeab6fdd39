use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use memberbill_core::{DomainError, DomainResult};
use memberbill_invoicing::{InvoiceId, LineItem, LineItemId, LineItemStore};

/// In-memory line item table.
///
/// Intended for tests/dev. Writes are last-write-wins.
#[derive(Debug, Default)]
pub struct InMemoryLineItemStore {
    rows: RwLock<HashMap<LineItemId, LineItem>>,
}

impl InMemoryLineItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> DomainError {
    DomainError::invariant("line item store lock poisoned")
}

impl LineItemStore for InMemoryLineItemStore {
    fn get(&self, id: LineItemId) -> DomainResult<Option<LineItem>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    fn save(&self, item: LineItem) -> DomainResult<()> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        rows.insert(item.id_typed(), item);
        Ok(())
    }

    fn delete(&self, id: LineItemId) -> DomainResult<Option<LineItem>> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        Ok(rows.remove(&id))
    }

    fn list_for_invoice(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut items: Vec<LineItem> = rows
            .values()
            .filter(|item| item.invoice_id() == invoice_id)
            .cloned()
            .collect();
        // Ties on name fall back to id so listings are stable.
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id_typed().cmp(&b.id_typed())));
        Ok(items)
    }

    fn discriminators(&self) -> DomainResult<Vec<String>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let distinct: BTreeSet<&str> = rows.values().map(|item| item.discriminator()).collect();
        Ok(distinct.into_iter().map(str::to_string).collect())
    }
}
