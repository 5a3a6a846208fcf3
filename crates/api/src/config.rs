//! Process configuration, read from the environment.

use anyhow::Context;
use tally_settlement::SettlementPolicy;

pub const BIND_VAR: &str = "TALLY_BIND";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub policy: SettlementPolicy,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind = std::env::var(BIND_VAR).unwrap_or_else(|_| {
            tracing::warn!("{BIND_VAR} not set; using {DEFAULT_BIND}");
            DEFAULT_BIND.to_string()
        });

        let policy = SettlementPolicy::from_env().context("invalid settlement policy")?;

        Ok(Self { bind, policy })
    }
}
