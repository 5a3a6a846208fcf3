//! Domain error model.

use thiserror::Error;

use crate::id::{ExpenseId, MemberId};
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure is explicit: nothing here is ever downgraded to a default
/// value (a missing member never becomes a zero-balance no-op).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An expense references a member absent from the group roster.
    #[error("unknown member {member} referenced by expense {expense}")]
    UnknownMember { member: MemberId, expense: ExpenseId },

    /// An expense's shares do not add up to its total.
    #[error("shares of expense {expense} sum to {shares}, expected {total}")]
    ShareMismatch {
        expense: ExpenseId,
        total: Money,
        shares: Money,
    },

    /// Balances handed to the planner do not sum to zero.
    #[error("balances do not sum to zero (off by {imbalance})")]
    BalanceConservation { imbalance: Money },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Money arithmetic left the representable range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_member(member: MemberId, expense: ExpenseId) -> Self {
        Self::UnknownMember { member, expense }
    }

    /// Stable machine-readable code, used by transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownMember { .. } => "unknown_member",
            Self::ShareMismatch { .. } => "share_mismatch",
            Self::BalanceConservation { .. } => "balance_conservation",
            Self::Validation(_) => "validation_error",
            Self::Overflow(_) => "overflow",
            Self::InvalidId(_) => "invalid_id",
        }
    }
}
