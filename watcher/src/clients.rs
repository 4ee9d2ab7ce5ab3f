use balance_engine::ChainClients;
use providers::{evm::PROVIDERS, ContractReader, SubstrateApi};
use std::sync::Arc;

/// Clients configured through the environment. Only EVM contract readers
/// have an RPC backend here: native, ledger, bridged and WASM adapters are
/// skipped until an embedder passes its own `ChainClients` with substrate
/// and WASM clients to `BalanceService::new`.
pub struct EnvClients;

impl ChainClients for EnvClients {
    fn substrate(&self, _chain: &str) -> Option<Arc<dyn SubstrateApi>> {
        None
    }

    fn evm(&self, chain: &str) -> Option<Arc<dyn ContractReader>> {
        PROVIDERS
            .get(chain)
            .map(|provider| Arc::clone(provider) as Arc<dyn ContractReader>)
    }

    fn wasm(&self, _chain: &str) -> Option<Arc<dyn ContractReader>> {
        None
    }
}
