//! Split rules: turn "split 100.00 three ways" into concrete shares.
//!
//! Every rule produces shares that add up to the total exactly. Proportional
//! rules use the largest-remainder method; leftover cents go to the largest
//! fractional parts, ties broken by ascending member id.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, MemberId, Money};

use crate::expense::Share;

/// 100% expressed in basis points.
pub const FULL_PERCENTAGE_BP: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method", content = "parts")]
pub enum Split {
    /// Everyone listed owes the same amount.
    Equal(Vec<MemberId>),
    /// Amounts are given explicitly.
    Exact(Vec<Share>),
    /// Percentages in basis points (`2_500` = 25%); must total 100%.
    Percentage(Vec<(MemberId, u32)>),
    /// Relative weights ("2 shares for Bob, 1 for Alice").
    Weighted(Vec<(MemberId, u32)>),
}

impl Split {
    pub fn into_shares(self, total: Money) -> DomainResult<Vec<Share>> {
        if !total.is_positive() {
            return Err(DomainError::validation("split total must be positive"));
        }

        match self {
            Split::Exact(shares) => Ok(shares),
            Split::Equal(members) => {
                let weights: Vec<(MemberId, u32)> = members.into_iter().map(|m| (m, 1)).collect();
                allocate(total, &weights)
            }
            Split::Percentage(parts) => {
                let sum: u64 = parts.iter().map(|(_, bp)| u64::from(*bp)).sum();
                if sum != u64::from(FULL_PERCENTAGE_BP) {
                    return Err(DomainError::validation(format!(
                        "percentages must add up to 100% (got {}.{:02}%)",
                        sum / 100,
                        sum % 100
                    )));
                }
                allocate(total, &parts)
            }
            Split::Weighted(parts) => allocate(total, &parts),
        }
    }
}

fn allocate(total: Money, weights: &[(MemberId, u32)]) -> DomainResult<Vec<Share>> {
    let mut seen = BTreeSet::new();
    if let Some((dup, _)) = weights.iter().find(|(m, _)| !seen.insert(*m)) {
        return Err(DomainError::validation(format!(
            "member {dup} listed more than once in split"
        )));
    }

    let parts: Vec<(MemberId, u128)> = weights
        .iter()
        .filter(|(_, w)| *w > 0)
        .map(|(m, w)| (*m, u128::from(*w)))
        .collect();
    let weight_sum: u128 = parts.iter().map(|(_, w)| w).sum();
    if weight_sum == 0 {
        return Err(DomainError::validation(
            "split needs at least one member with a positive weight",
        ));
    }

    // total is positive (checked by the caller)
    let total_cents = u128::from(total.cents().unsigned_abs());

    let mut allocated: Vec<(MemberId, u128, u128)> = parts
        .iter()
        .map(|(m, w)| {
            let exact = total_cents * w;
            (*m, exact / weight_sum, exact % weight_sum)
        })
        .collect();

    let floor_sum: u128 = allocated.iter().map(|(_, base, _)| base).sum();
    let leftover = (total_cents - floor_sum) as usize;

    let mut order: Vec<usize> = (0..allocated.len()).collect();
    order.sort_by(|&a, &b| {
        allocated[b]
            .2
            .cmp(&allocated[a].2)
            .then(allocated[a].0.cmp(&allocated[b].0))
    });
    for &idx in order.iter().take(leftover) {
        allocated[idx].1 += 1;
    }

    allocated
        .into_iter()
        .map(|(member, cents, _)| {
            let cents = i64::try_from(cents)
                .map_err(|_| DomainError::overflow(format!("share of member {member}")))?;
            Ok(Share::new(member, Money::from_cents(cents)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: u64) -> MemberId {
        MemberId::new(id)
    }

    fn amounts(shares: &[Share]) -> Vec<(u64, i64)> {
        shares
            .iter()
            .map(|s| (s.member.get(), s.amount.cents()))
            .collect()
    }

    #[test]
    fn equal_split_hands_leftover_cents_to_lowest_ids() {
        let shares = Split::Equal(vec![m(3), m(1), m(2)])
            .into_shares(Money::from_cents(10_000))
            .unwrap();
        assert_eq!(amounts(&shares), vec![(3, 3333), (1, 3334), (2, 3333)]);
    }

    #[test]
    fn percentage_split_follows_largest_remainder() {
        // 10.01 at 50/30/20 -> 5.005 / 3.003 / 2.002
        let shares = Split::Percentage(vec![(m(1), 5_000), (m(2), 3_000), (m(3), 2_000)])
            .into_shares(Money::from_cents(1_001))
            .unwrap();
        assert_eq!(amounts(&shares), vec![(1, 501), (2, 300), (3, 200)]);
    }

    #[test]
    fn percentage_split_must_cover_everything() {
        let err = Split::Percentage(vec![(m(1), 5_000), (m(2), 4_000)])
            .into_shares(Money::from_cents(100))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("percentages must add up to 100% (got 90.00%)")
        );
    }

    #[test]
    fn weighted_split_skips_zero_weights() {
        let shares = Split::Weighted(vec![(m(1), 2), (m(2), 0), (m(3), 1)])
            .into_shares(Money::from_cents(900))
            .unwrap();
        assert_eq!(amounts(&shares), vec![(1, 600), (3, 300)]);
    }

    #[test]
    fn degenerate_splits_are_rejected() {
        assert!(Split::Weighted(vec![(m(1), 0)])
            .into_shares(Money::from_cents(100))
            .is_err());
        assert!(Split::Equal(vec![]).into_shares(Money::from_cents(100)).is_err());
        assert!(Split::Equal(vec![m(1), m(1)])
            .into_shares(Money::from_cents(100))
            .is_err());
        assert!(Split::Equal(vec![m(1)]).into_shares(Money::ZERO).is_err());
    }

    #[test]
    fn exact_split_passes_through() {
        let given = vec![Share::new(m(1), Money::from_cents(70)), Share::new(m(2), Money::from_cents(30))];
        let shares = Split::Exact(given.clone())
            .into_shares(Money::from_cents(100))
            .unwrap();
        assert_eq!(shares, given);
    }

    #[test]
    fn proportional_splits_always_sum_to_total() {
        for total in [1i64, 2, 99, 100, 101, 12_345, 99_999] {
            let shares = Split::Weighted(vec![(m(1), 7), (m(2), 3), (m(3), 5), (m(4), 1)])
                .into_shares(Money::from_cents(total))
                .unwrap();
            let sum: i64 = shares.iter().map(|s| s.amount.cents()).sum();
            assert_eq!(sum, total);
        }
    }
}
