//! In-memory persistence adapters for tests/dev.

pub mod invoices;
pub mod line_items;

pub use invoices::InMemoryInvoiceStore;
pub use line_items::InMemoryLineItemStore;
