//! Balance aggregation: expenses in, one net balance per member out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, MemberId, Money};

use crate::expense::ExpenseRecord;
use crate::planner::SettlementInstruction;
use crate::policy::{SettlementPolicy, ShareValidation};

/// Net position of every member in a group.
///
/// Positive: the group owes the member. Negative: the member owes the group.
/// Backed by an ordered map so iteration (and everything derived from it) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances(BTreeMap<MemberId, Money>);

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, member: MemberId) -> Option<Money> {
        self.0.get(&member).copied()
    }

    pub fn insert(&mut self, member: MemberId, balance: Money) -> Option<Money> {
        self.0.insert(member, balance)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, Money)> + '_ {
        self.0.iter().map(|(m, b)| (*m, *b))
    }

    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.0.keys().copied()
    }

    pub fn total(&self) -> DomainResult<Money> {
        Money::checked_sum(self.0.values().copied())
    }

    pub fn non_zero_count(&self) -> usize {
        self.0.values().filter(|b| !b.is_zero()).count()
    }

    /// Whether every balance is within `tolerance` of zero.
    pub fn is_settled(&self, tolerance: Money) -> bool {
        self.0.values().all(|b| b.is_within(tolerance))
    }

    /// Balances after every instruction has been paid.
    ///
    /// A payment raises the payer's balance (they owe less) and lowers the
    /// recipient's (they are owed less).
    pub fn apply(&self, instructions: &[SettlementInstruction]) -> DomainResult<Balances> {
        let mut next = self.clone();
        for ins in instructions {
            next.adjust(ins.from, ins.amount)?;
            next.adjust(ins.to, -ins.amount)?;
        }
        Ok(next)
    }

    fn adjust(&mut self, member: MemberId, delta: Money) -> DomainResult<()> {
        let slot = self.0.entry(member).or_insert(Money::ZERO);
        *slot = slot
            .checked_add(delta)
            .ok_or_else(|| DomainError::overflow(format!("balance of member {member}")))?;
        Ok(())
    }
}

impl FromIterator<(MemberId, Money)> for Balances {
    fn from_iter<T: IntoIterator<Item = (MemberId, Money)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Balances {
    type Item = (MemberId, Money);
    type IntoIter = std::collections::btree_map::IntoIter<MemberId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Net balances under the default policy.
pub fn compute_balances<M>(members: M, expenses: &[ExpenseRecord]) -> DomainResult<Balances>
where
    M: IntoIterator<Item = MemberId>,
{
    compute_balances_with(members, expenses, &SettlementPolicy::default())
}

/// Net balances for `members` given `expenses`.
///
/// Every roster member is present in the result, including those with a zero
/// balance. Under `ShareValidation::Reject` the payer is credited with the
/// share sum, so a rounding gap within the share tolerance still nets to zero.
/// Under `ShareValidation::Trust` the payer is credited with the expense total;
/// a mismatch the caller vouched for then shows up as an imbalance that the
/// planner's conservation check rejects.
///
/// Fails without partial output when an expense is invalid or mentions a
/// member outside the roster.
pub fn compute_balances_with<M>(
    members: M,
    expenses: &[ExpenseRecord],
    policy: &SettlementPolicy,
) -> DomainResult<Balances>
where
    M: IntoIterator<Item = MemberId>,
{
    let mut balances: Balances = members.into_iter().map(|m| (m, Money::ZERO)).collect();

    for expense in expenses {
        if let Err(err) = expense.validate(policy) {
            tracing::warn!(expense = %expense.id, error = %err, "rejecting expense");
            return Err(err);
        }

        if let Some(unknown) = expense
            .participants()
            .find(|m| !balances.0.contains_key(m))
        {
            tracing::warn!(expense = %expense.id, member = %unknown, "expense references unknown member");
            return Err(DomainError::unknown_member(unknown, expense.id));
        }

        let credit = match policy.share_validation {
            ShareValidation::Reject => expense.shares_total()?,
            ShareValidation::Trust => expense.total,
        };
        balances.adjust(expense.payer, credit)?;
        for share in &expense.shares {
            balances.adjust(share.member, -share.amount)?;
        }
    }

    tracing::debug!(
        members = balances.len(),
        expenses = expenses.len(),
        "balances computed"
    );
    Ok(balances)
}
