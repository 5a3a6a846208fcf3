use serde::{Deserialize, Serialize};

use tally_core::{DomainError, MemberId, Money};
use tally_settlement::{Balances, ExpenseRecord, SettlementInstruction};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SettleGroupRequest {
    pub members: Vec<MemberId>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub balances: Vec<BalanceEntry>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    pub member: MemberId,
    pub balance: Money,
}

/// Wire shape of a payment: `from_user` pays `amount` to `to_user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementDto {
    pub from_user: MemberId,
    pub to_user: MemberId,
    pub amount: Money,
}

#[derive(Debug, Serialize)]
pub struct SettleGroupResponse {
    pub balances: Vec<BalanceEntry>,
    pub settlements: Vec<SettlementDto>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub settlements: Vec<SettlementDto>,
}

// -------------------------
// Mapping helpers
// -------------------------

pub fn settlement_to_dto(ins: &SettlementInstruction) -> SettlementDto {
    SettlementDto {
        from_user: ins.from,
        to_user: ins.to,
        amount: ins.amount,
    }
}

pub fn balances_to_entries(balances: &Balances) -> Vec<BalanceEntry> {
    balances
        .iter()
        .map(|(member, balance)| BalanceEntry { member, balance })
        .collect()
}

/// Rejects payloads listing the same member twice instead of merging them.
pub fn entries_to_balances(entries: Vec<BalanceEntry>) -> Result<Balances, DomainError> {
    let mut balances = Balances::new();
    for entry in entries {
        if balances.insert(entry.member, entry.balance).is_some() {
            return Err(DomainError::validation(format!(
                "member {} listed more than once",
                entry.member
            )));
        }
    }
    Ok(balances)
}
