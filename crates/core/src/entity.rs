//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Line items are entities: two items with identical fields are still
/// different rows of an invoice.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
