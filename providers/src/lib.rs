pub mod evm;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;

pub use evm::Provider;
pub use web3::types::{H160, U256};

/// Account identifier as handed over by the caller. Never re-encoded here.
pub type Address = String;

/// Live storage feed. Every item holds one decoded entry per queried
/// address, in the order of the address slice the feed was opened with,
/// `Value::Null` standing for an empty storage slot. Dropping the stream
/// unsubscribes.
///
/// Balances larger than `u64` must be delivered as decimal or `0x` strings.
pub type Feed = BoxStream<'static, Vec<Value>>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Web3Contract(#[from] web3::contract::Error),
    #[error(transparent)]
    Web3(#[from] web3::Error),
    #[error(transparent)]
    Abi(#[from] web3::ethabi::Error),
    #[error("Invalid address `{0}`")]
    InvalidAddress(String),
    #[error("Storage `{0}` is not available on this chain")]
    StorageUnavailable(&'static str),
    #[error("{0}")]
    Other(String),
}

/// Token ledgers keyed by (address, asset id).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LedgerStorage {
    /// `tokens.accounts`
    Tokens,
    /// Multi-currency ledger that may also hold the native token.
    Currencies,
    /// `assets.account`
    Assets,
}

impl LedgerStorage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStorage::Tokens => "tokens",
            LedgerStorage::Currencies => "currencies",
            LedgerStorage::Assets => "assets",
        }
    }
}

/// Query and subscription surface of a substrate-style chain client.
///
/// Implementations are shared between many adapters and must not change
/// connection state on behalf of the caller.
#[async_trait]
pub trait SubstrateApi: Send + Sync {
    async fn ready(&self) -> Result<(), ProviderError>;

    /// `system.account` for every address.
    async fn subscribe_accounts(&self, addresses: &[Address]) -> Result<Feed, ProviderError>;

    /// Whether the runtime has a nomination pool membership ledger.
    fn has_pool_members(&self) -> bool;

    /// `nominationPools.poolMembers` for every address.
    async fn subscribe_pool_members(&self, addresses: &[Address]) -> Result<Feed, ProviderError>;

    async fn subscribe_ledger(
        &self,
        storage: LedgerStorage,
        asset_id: &Value,
        addresses: &[Address],
    ) -> Result<Feed, ProviderError>;

    /// `foreignAssets.account` keyed by a cross-chain location.
    async fn subscribe_foreign_assets(
        &self,
        location: &Value,
        addresses: &[Address],
    ) -> Result<Feed, ProviderError>;
}

/// One-shot fungible balance reads against a token contract.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn balance_of(&self, contract: &str, owner: &str) -> Result<U256, ProviderError>;
}
