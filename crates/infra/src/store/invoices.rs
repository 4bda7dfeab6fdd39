use std::collections::HashMap;
use std::sync::RwLock;

use memberbill_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion};
use memberbill_invoicing::{Invoice, InvoiceId, InvoiceStore};

/// In-memory invoice table with optimistic concurrency.
///
/// Intended for tests/dev. An absent invoice is at version 0.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    rows: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DomainError {
    DomainError::invariant("invoice store lock poisoned")
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn get(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    fn save(&self, invoice: Invoice, expected: ExpectedVersion) -> DomainResult<Invoice> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let current = rows
            .get(&invoice.id_typed())
            .map(|stored| stored.version())
            .unwrap_or(0);
        expected.check(current)?;

        let stored = invoice.with_version(current + 1);
        rows.insert(stored.id_typed(), stored.clone());
        Ok(stored)
    }
}
