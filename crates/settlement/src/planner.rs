//! Settlement planning: net balances in, a short list of payments out.
//!
//! Greedy largest-creditor / largest-debtor matching. Each step pays off at
//! least one party completely, so `n` non-zero members need at most `n - 1`
//! payments. The result is not guaranteed to be globally minimal (that
//! problem is NP-hard) but is always complete and deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, MemberId, Money, ValueObject};

use crate::balances::Balances;
use crate::policy::SettlementPolicy;

/// "`from` pays `amount` to `to`."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

impl ValueObject for SettlementInstruction {}

/// Heap entry: biggest magnitude first, then lowest member id.
type Party = (Money, Reverse<MemberId>);

#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementPlanner {
    policy: SettlementPolicy,
}

impl SettlementPlanner {
    pub fn new(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    /// Payments that bring every balance to zero, in emission order.
    ///
    /// Fails with `BalanceConservation` (and emits nothing) when the balances
    /// are off by more than the conservation tolerance. An imbalance within
    /// the tolerance is left with whoever holds it once the other side is
    /// exhausted. A debt of `i64::MIN` cents has no magnitude and fails with
    /// `Overflow`.
    pub fn plan(&self, balances: &Balances) -> DomainResult<Vec<SettlementInstruction>> {
        let imbalance = balances.total()?;
        if !imbalance.is_within(self.policy.conservation_tolerance) {
            tracing::warn!(%imbalance, "balances do not sum to zero");
            return Err(DomainError::BalanceConservation { imbalance });
        }

        let mut creditors: BinaryHeap<Party> = BinaryHeap::new();
        let mut debtors: BinaryHeap<Party> = BinaryHeap::new();
        for (member, balance) in balances.iter() {
            if balance.is_positive() {
                creditors.push((balance, Reverse(member)));
            } else if balance.is_negative() {
                let debt = balance
                    .checked_abs()
                    .ok_or_else(|| DomainError::overflow(format!("balance of member {member}")))?;
                debtors.push((debt, Reverse(member)));
            }
        }

        let mut instructions = Vec::with_capacity(creditors.len() + debtors.len());

        while let (Some(&(credit, Reverse(creditor))), Some(&(debt, Reverse(debtor)))) =
            (creditors.peek(), debtors.peek())
        {
            creditors.pop();
            debtors.pop();

            let amount = credit.min(debt);
            tracing::debug!(from = %debtor, to = %creditor, %amount, "settlement step");
            instructions.push(SettlementInstruction {
                from: debtor,
                to: creditor,
                amount,
            });

            let credit_left = credit - amount;
            let debt_left = debt - amount;
            if credit_left.is_positive() {
                creditors.push((credit_left, Reverse(creditor)));
            }
            if debt_left.is_positive() {
                debtors.push((debt_left, Reverse(debtor)));
            }
        }

        if let Some((dust, Reverse(member))) = creditors.peek().or(debtors.peek()) {
            tracing::debug!(%member, %dust, "leaving tolerated remainder unsettled");
        }

        Ok(instructions)
    }
}

/// Plan payments under the default policy.
pub fn compute_settlements(balances: &Balances) -> DomainResult<Vec<SettlementInstruction>> {
    SettlementPlanner::default().plan(balances)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn m(id: u64) -> MemberId {
        MemberId::new(id)
    }

    fn balances(pairs: &[(u64, i64)]) -> Balances {
        pairs
            .iter()
            .map(|(id, c)| (m(*id), Money::from_cents(*c)))
            .collect()
    }

    fn pay(from: u64, to: u64, cents: i64) -> SettlementInstruction {
        SettlementInstruction {
            from: m(from),
            to: m(to),
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn largest_debtor_pays_first() {
        // A=1: +100, B=2: -40, C=3: -60
        let plan = compute_settlements(&balances(&[(1, 10_000), (2, -4_000), (3, -6_000)])).unwrap();
        assert_eq!(plan, vec![pay(3, 1, 6_000), pay(2, 1, 4_000)]);
    }

    #[test]
    fn remaining_debt_goes_back_into_the_pool() {
        // A=1: +50, B=2: +50, C=3: -30, D=4: -70
        // D pays A 50 (tie between A and B -> lower id). D is left at -20,
        // so C (-30) is now the largest debtor and pays B before D does.
        let plan = compute_settlements(&balances(&[
            (1, 5_000),
            (2, 5_000),
            (3, -3_000),
            (4, -7_000),
        ]))
        .unwrap();
        assert_eq!(
            plan,
            vec![pay(4, 1, 5_000), pay(3, 2, 3_000), pay(4, 2, 2_000)]
        );
    }

    #[test]
    fn ties_resolve_by_ascending_member_id() {
        let plan = compute_settlements(&balances(&[
            (9, 1_000),
            (4, 1_000),
            (7, -1_000),
            (2, -1_000),
        ]))
        .unwrap();
        assert_eq!(plan, vec![pay(2, 4, 1_000), pay(7, 9, 1_000)]);
    }

    #[test]
    fn trivial_inputs_need_no_payments() {
        assert!(compute_settlements(&Balances::new()).unwrap().is_empty());
        assert!(compute_settlements(&balances(&[(1, 0)])).unwrap().is_empty());
        assert!(compute_settlements(&balances(&[(1, 0), (2, 0), (3, 0)]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn lone_member_with_a_balance_violates_conservation() {
        assert_eq!(
            compute_settlements(&balances(&[(1, 500)])),
            Err(DomainError::BalanceConservation {
                imbalance: Money::from_cents(500)
            })
        );
    }

    #[test]
    fn imbalance_beyond_tolerance_is_rejected() {
        let err = compute_settlements(&balances(&[(1, 10_000), (2, -9_000)])).unwrap_err();
        assert_eq!(
            err,
            DomainError::BalanceConservation {
                imbalance: Money::from_cents(1_000)
            }
        );
    }

    #[test]
    fn one_cent_of_dust_is_tolerated_and_left_alone() {
        let input = balances(&[(1, 3_334), (2, -1_666), (3, -1_667)]);
        let plan = compute_settlements(&input).unwrap();
        assert_eq!(plan, vec![pay(3, 1, 1_667), pay(2, 1, 1_666)]);

        let after = input.apply(&plan).unwrap();
        assert!(after.is_settled(Money::EPSILON));
        assert_eq!(after.get(m(1)), Some(Money::from_cents(1)));
    }

    #[test]
    fn exact_policy_rejects_dust() {
        let planner = SettlementPlanner::new(SettlementPolicy::exact());
        assert!(matches!(
            planner.plan(&balances(&[(1, 3_334), (2, -1_666), (3, -1_667)])),
            Err(DomainError::BalanceConservation { .. })
        ));
    }

    #[test]
    fn single_cent_balances_still_settle() {
        let plan = compute_settlements(&balances(&[(1, 1), (2, -1)])).unwrap();
        assert_eq!(plan, vec![pay(2, 1, 1)]);
    }

    #[test]
    fn unrepresentable_debt_is_an_overflow() {
        let input = balances(&[(1, i64::MIN), (2, i64::MAX), (3, 1)]);
        assert_eq!(input.total().unwrap(), Money::ZERO);
        assert!(matches!(
            compute_settlements(&input),
            Err(DomainError::Overflow(msg)) if msg.contains("member 1")
        ));
    }

    fn arb_balances() -> impl Strategy<Value = Balances> {
        prop::collection::vec(-1_000_000i64..1_000_000, 1..12).prop_map(|mut raw| {
            // close the group: last member absorbs the remainder
            let sum: i64 = raw.iter().sum();
            raw.push(-sum);
            raw.into_iter()
                .enumerate()
                .map(|(idx, c)| (MemberId::new(idx as u64 * 3 % 17), Money::from_cents(c)))
                .fold(Balances::new(), |mut acc, (member, balance)| {
                    let prior = acc.get(member).unwrap_or(Money::ZERO);
                    acc.insert(member, prior + balance);
                    acc
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: paying every instruction zeroes every balance.
        #[test]
        fn plan_zeroes_all_balances(input in arb_balances()) {
            let plan = compute_settlements(&input).unwrap();
            let after = input.apply(&plan).unwrap();
            prop_assert!(after.is_settled(Money::ZERO));
        }

        /// Property: at most n - 1 payments for n non-zero members, each one
        /// positive and never to oneself.
        #[test]
        fn plan_is_short_and_well_formed(input in arb_balances()) {
            let plan = compute_settlements(&input).unwrap();
            let bound = input.non_zero_count().saturating_sub(1);
            prop_assert!(plan.len() <= bound);
            for ins in &plan {
                prop_assert!(ins.amount.is_positive());
                prop_assert_ne!(ins.from, ins.to);
            }
        }

        /// Property: identical input, identical output.
        #[test]
        fn plan_is_deterministic(input in arb_balances()) {
            let first = serde_json::to_string(&compute_settlements(&input).unwrap()).unwrap();
            let second = serde_json::to_string(&compute_settlements(&input.clone()).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: a member whose balance reached zero never shows up again.
        #[test]
        fn settled_members_are_not_revisited(input in arb_balances()) {
            let plan = compute_settlements(&input).unwrap();
            let mut running = input.clone();
            let mut settled = std::collections::BTreeSet::new();
            for ins in &plan {
                prop_assert!(!settled.contains(&ins.from));
                prop_assert!(!settled.contains(&ins.to));
                running = running.apply(std::slice::from_ref(ins)).unwrap();
                for member in [ins.from, ins.to] {
                    if running.get(member) == Some(Money::ZERO) {
                        settled.insert(member);
                    }
                }
            }
        }
    }
}
