use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, Entity, ExpenseId, MemberId, Money, ValueObject};

use crate::policy::{SettlementPolicy, ShareValidation};
use crate::split::Split;

/// One member's part of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub member: MemberId,
    pub amount: Money,
}

impl ValueObject for Share {}

impl Share {
    pub fn new(member: MemberId, amount: Money) -> Self {
        Self { member, amount }
    }
}

/// A logged expense: who paid, how much, and who owes which part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub payer: MemberId,
    pub total: Money,
    pub shares: Vec<Share>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Entity for ExpenseRecord {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ExpenseRecord {
    pub fn new(id: ExpenseId, payer: MemberId, total: Money, shares: Vec<Share>) -> Self {
        Self {
            id,
            payer,
            total,
            shares,
            name: None,
        }
    }

    /// Build an expense whose shares are derived from a split rule.
    pub fn from_split(
        id: ExpenseId,
        payer: MemberId,
        total: Money,
        split: Split,
    ) -> DomainResult<Self> {
        let shares = split.into_shares(total)?;
        Ok(Self::new(id, payer, total, shares))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sum of all share amounts.
    pub fn shares_total(&self) -> DomainResult<Money> {
        Money::checked_sum(self.shares.iter().map(|s| s.amount))
    }

    /// Members referenced by this expense (payer first, then share holders).
    pub fn participants(&self) -> impl Iterator<Item = MemberId> + '_ {
        core::iter::once(self.payer).chain(self.shares.iter().map(|s| s.member))
    }

    /// Input boundary check.
    ///
    /// Structural rules always apply; the share-sum rule is skipped when the
    /// policy trusts upstream validation.
    pub fn validate(&self, policy: &SettlementPolicy) -> DomainResult<()> {
        if !self.total.is_positive() {
            return Err(DomainError::validation(format!(
                "expense {}: total must be positive",
                self.id
            )));
        }

        if self.shares.is_empty() {
            return Err(DomainError::validation(format!(
                "expense {}: shares must not be empty",
                self.id
            )));
        }

        let mut seen = BTreeSet::new();
        for share in &self.shares {
            if share.amount.is_negative() {
                return Err(DomainError::validation(format!(
                    "expense {}: share of member {} must not be negative",
                    self.id, share.member
                )));
            }
            if !seen.insert(share.member) {
                return Err(DomainError::validation(format!(
                    "expense {}: member {} has more than one share",
                    self.id, share.member
                )));
            }
        }

        if policy.share_validation == ShareValidation::Trust {
            return Ok(());
        }

        let shares = self.shares_total()?;
        let gap = shares
            .checked_sub(self.total)
            .ok_or_else(|| DomainError::overflow("share gap"))?;
        if !gap.is_within(policy.share_tolerance) {
            return Err(DomainError::ShareMismatch {
                expense: self.id,
                total: self.total,
                shares,
            });
        }

        Ok(())
    }
}
