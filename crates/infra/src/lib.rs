//! Infrastructure layer: storage adapters, configuration, wiring.

pub mod billing;
pub mod config;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use billing::Billing;
pub use config::BillingConfig;
pub use store::{InMemoryInvoiceStore, InMemoryLineItemStore};
