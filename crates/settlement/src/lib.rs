//! Debt settlement for shared-expense groups.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.
//!
//! Data flows one way: expenses -> [`compute_balances`] -> [`compute_settlements`].

pub mod balances;
pub mod expense;
pub mod planner;
pub mod policy;
pub mod split;

use serde::{Deserialize, Serialize};
use tally_core::{DomainResult, MemberId};

pub use balances::{Balances, compute_balances, compute_balances_with};
pub use expense::{ExpenseRecord, Share};
pub use planner::{SettlementInstruction, SettlementPlanner, compute_settlements};
pub use policy::{SettlementPolicy, ShareValidation};
pub use split::Split;

/// Balances and the payments that clear them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub balances: Balances,
    pub settlements: Vec<SettlementInstruction>,
}

/// Full pipeline for one group under the default policy.
pub fn settle_group<M>(members: M, expenses: &[ExpenseRecord]) -> DomainResult<Plan>
where
    M: IntoIterator<Item = MemberId>,
{
    settle_group_with(members, expenses, &SettlementPolicy::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(expenses = expenses.len()))]
pub fn settle_group_with<M>(
    members: M,
    expenses: &[ExpenseRecord],
    policy: &SettlementPolicy,
) -> DomainResult<Plan>
where
    M: IntoIterator<Item = MemberId>,
{
    let balances = compute_balances_with(members, expenses, policy)?;
    let settlements = SettlementPlanner::new(*policy).plan(&balances)?;
    tracing::info!(
        members = balances.len(),
        payments = settlements.len(),
        "settlement planned"
    );
    Ok(Plan {
        balances,
        settlements,
    })
}
