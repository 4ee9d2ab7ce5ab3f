use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub slug: String,
    pub native_token: String,
    #[serde(default)]
    pub evm_compatible: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub capabilities: ChainCapabilities,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainCapabilities {
    /// Native token kept in `system.account`.
    pub native_ledger: bool,
    /// Relay chain with nomination pools.
    pub pool_staking: bool,
    pub local_ledger: Option<LocalLedger>,
    pub bridged_assets: bool,
    pub wasm_contracts: bool,
    /// Chain hosting privacy-preserving (zk) assets.
    pub zk_assets: bool,
    /// Accounts in the chain's own storage are keyed by 20-byte EVM
    /// addresses instead of SS58 ones.
    #[serde(rename = "h160Accounts")]
    pub h160_accounts: bool,
}

impl Default for ChainCapabilities {
    fn default() -> Self {
        Self {
            native_ledger: true,
            pool_staking: false,
            local_ledger: None,
            bridged_assets: false,
            wasm_contracts: false,
            zk_assets: false,
            h160_accounts: false,
        }
    }
}

/// Ledger holding the chain's local tokens. At most one per chain.
#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalLedger {
    Tokens,
    /// When `includes_native` is set the native token lives in this ledger
    /// and the chain has no usable `system.account` balance.
    Currencies {
        #[serde(default, rename = "includesNative")]
        includes_native: bool,
    },
    Assets,
}

impl LocalLedger {
    pub fn storage(&self) -> providers::LedgerStorage {
        match self {
            LocalLedger::Tokens => providers::LedgerStorage::Tokens,
            LocalLedger::Currencies { .. } => providers::LedgerStorage::Currencies,
            LocalLedger::Assets => providers::LedgerStorage::Assets,
        }
    }

    pub fn includes_native(&self) -> bool {
        matches!(
            self,
            LocalLedger::Currencies {
                includes_native: true
            }
        )
    }
}

impl ChainDescriptor {
    pub fn new(slug: &str, native_token: &str) -> Self {
        Self {
            slug: slug.to_owned(),
            native_token: native_token.to_owned(),
            evm_compatible: false,
            active: true,
            capabilities: ChainCapabilities::default(),
        }
    }
}
