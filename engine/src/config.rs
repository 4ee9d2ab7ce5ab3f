use crate::errors::EngineError;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_PRIVACY_PREFIX: &str = "zk";

const POLL_INTERVAL_VAR: &str = "CONTRACT_POLL_INTERVAL_MS";
const PRIVACY_PREFIX_VAR: &str = "PRIVACY_SYMBOL_PREFIX";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Period of the contract balance pollers.
    pub contract_poll_interval: Duration,
    /// Symbol prefix reserved for privacy-preserving assets, which are
    /// not tracked through the token ledgers.
    pub privacy_symbol_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contract_poll_interval: DEFAULT_POLL_INTERVAL,
            privacy_symbol_prefix: DEFAULT_PRIVACY_PREFIX.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `CONTRACT_POLL_INTERVAL_MS` and
    /// `PRIVACY_SYMBOL_PREFIX` when set.
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(POLL_INTERVAL_VAR) {
            match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.contract_poll_interval = Duration::from_millis(ms),
                _ => {
                    return Err(EngineError::Config {
                        var: POLL_INTERVAL_VAR,
                        value,
                    })
                }
            }
        }

        if let Some(value) = lookup(PRIVACY_PREFIX_VAR) {
            config.privacy_symbol_prefix = value;
        }

        Ok(config)
    }
}
