//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Expenses are entities: two records with the same id describe the same
/// expense even if their shares were edited in between.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
