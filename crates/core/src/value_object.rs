//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values. [`crate::Money`] and the invoicing `VatRate` are value
//! objects; line items are entities.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// create a new one with the new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
