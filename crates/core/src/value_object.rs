//! Value object trait: equality by value, not identity.
//!
//! Amounts and shares have no identity of their own: two `Money` values of
//! 12.34 are interchangeable, and so are two shares naming the same member
//! and amount.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "change" one, build
/// a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Share {
///     member: MemberId,
///     amount: Money,
/// }
///
/// impl ValueObject for Share {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
