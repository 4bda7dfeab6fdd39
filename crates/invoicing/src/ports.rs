//! Persistence ports.
//!
//! The datastore is an external collaborator; these traits name the handful
//! of operations the invoicing logic needs from it. `memberbill-infra` ships
//! in-memory implementations.

use std::sync::Arc;

use memberbill_core::{DomainResult, ExpectedVersion};

use crate::invoice::{Invoice, InvoiceId};
use crate::line_item::{LineItem, LineItemId};

/// Line item rows.
pub trait LineItemStore: Send + Sync {
    fn get(&self, id: LineItemId) -> DomainResult<Option<LineItem>>;

    /// Insert or replace (last write wins).
    fn save(&self, item: LineItem) -> DomainResult<()>;

    /// Remove a row, returning it if it existed.
    fn delete(&self, id: LineItemId) -> DomainResult<Option<LineItem>>;

    /// All line items of an invoice, ordered by name ascending.
    fn list_for_invoice(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>>;

    /// Distinct discriminators present in storage.
    fn discriminators(&self) -> DomainResult<Vec<String>>;
}

/// Invoice rows (only the parts line items feed into).
pub trait InvoiceStore: Send + Sync {
    fn get(&self, id: InvoiceId) -> DomainResult<Option<Invoice>>;

    /// Write `invoice` if the stored version matches `expected`.
    ///
    /// Returns the invoice stamped with its new version.
    fn save(&self, invoice: Invoice, expected: ExpectedVersion) -> DomainResult<Invoice>;
}

impl<S> LineItemStore for Arc<S>
where
    S: LineItemStore + ?Sized,
{
    fn get(&self, id: LineItemId) -> DomainResult<Option<LineItem>> {
        (**self).get(id)
    }

    fn save(&self, item: LineItem) -> DomainResult<()> {
        (**self).save(item)
    }

    fn delete(&self, id: LineItemId) -> DomainResult<Option<LineItem>> {
        (**self).delete(id)
    }

    fn list_for_invoice(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>> {
        (**self).list_for_invoice(invoice_id)
    }

    fn discriminators(&self) -> DomainResult<Vec<String>> {
        (**self).discriminators()
    }
}

impl<S> InvoiceStore for Arc<S>
where
    S: InvoiceStore + ?Sized,
{
    fn get(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        (**self).get(id)
    }

    fn save(&self, invoice: Invoice, expected: ExpectedVersion) -> DomainResult<Invoice> {
        (**self).save(invoice, expected)
    }
}
