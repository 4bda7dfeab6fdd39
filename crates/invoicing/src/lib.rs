//! Invoicing domain module: line item costing.
//!
//! A line item's cost is either `unit_cost × count` or the output of a
//! pluggable cost function; VAT is applied on top. Whenever a line item is
//! saved or deleted its invoice recomputes its totals.
//!
//! Persistence is reached through the traits in [`ports`]; this crate does
//! no IO of its own.

pub mod events;
pub mod invoice;
pub mod line_item;
pub mod ports;
pub mod recalculation;
pub mod service;
pub mod variant;
pub mod vat;

pub use events::{LINE_ITEM_AGGREGATE_TYPE, LineItemEvent, LineItemRemoved, LineItemSaved};
pub use invoice::{Invoice, InvoiceId, InvoiceTotals};
pub use line_item::{LineItem, LineItemId};
pub use ports::{InvoiceStore, LineItemStore};
pub use recalculation::InvoiceRecalculation;
pub use service::LineItemService;
pub use variant::{BASE_DISCRIMINATOR, CostParameters, DynamicCost, LineItemKind, VariantRegistry};
pub use vat::VatRate;
