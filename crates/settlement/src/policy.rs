//! Settlement policy (tolerances + share validation mode).
//!
//! Configured from the environment, the same way the API binary picks up the
//! rest of its settings:
//!
//! - `TALLY_SHARE_TOLERANCE`: max gap between an expense's shares and its total
//! - `TALLY_CONSERVATION_TOLERANCE`: max imbalance accepted by the planner
//! - `TALLY_SHARE_VALIDATION`: `reject` (default) or `trust`

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, Money};

pub const SHARE_TOLERANCE_VAR: &str = "TALLY_SHARE_TOLERANCE";
pub const CONSERVATION_TOLERANCE_VAR: &str = "TALLY_CONSERVATION_TOLERANCE";
pub const SHARE_VALIDATION_VAR: &str = "TALLY_SHARE_VALIDATION";

/// What to do with expenses whose shares do not add up to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareValidation {
    /// Fail with `DomainError::ShareMismatch`.
    #[default]
    Reject,
    /// Assume the expense-creation layer already checked the sums.
    Trust,
}

impl core::str::FromStr for ShareValidation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "trust" => Ok(Self::Trust),
            other => Err(DomainError::validation(format!(
                "share validation must be one of: reject, trust (got {other:?})"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPolicy {
    pub share_tolerance: Money,
    pub conservation_tolerance: Money,
    pub share_validation: ShareValidation,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            share_tolerance: Money::EPSILON,
            conservation_tolerance: Money::EPSILON,
            share_validation: ShareValidation::Reject,
        }
    }
}

impl SettlementPolicy {
    /// Strict policy: shares must match exactly and balances must sum to zero.
    pub fn exact() -> Self {
        Self {
            share_tolerance: Money::ZERO,
            conservation_tolerance: Money::ZERO,
            share_validation: ShareValidation::Reject,
        }
    }

    /// Read the policy from process environment variables.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the policy from an arbitrary key lookup (unset keys keep defaults).
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::default();

        if let Some(raw) = lookup(SHARE_TOLERANCE_VAR) {
            policy.share_tolerance = parse_tolerance(SHARE_TOLERANCE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CONSERVATION_TOLERANCE_VAR) {
            policy.conservation_tolerance = parse_tolerance(CONSERVATION_TOLERANCE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(SHARE_VALIDATION_VAR) {
            policy.share_validation = raw
                .parse::<ShareValidation>()
                .map_err(|e| DomainError::validation(format!("{SHARE_VALIDATION_VAR}: {e}")))?;
        }

        Ok(policy)
    }
}

fn parse_tolerance(var: &str, raw: &str) -> DomainResult<Money> {
    let value = raw
        .parse::<Money>()
        .map_err(|e| DomainError::validation(format!("{var}: {e}")))?;
    if value.is_negative() {
        return Err(DomainError::validation(format!(
            "{var}: tolerance must not be negative"
        )));
    }
    Ok(value)
}
