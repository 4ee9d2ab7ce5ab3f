//! Scripted chain clients for tests.

use crate::{
    service::ChainClients,
    types::{BalanceRecord, OnChainId, TokenDescriptor, TokenKind, U256},
};
use async_trait::async_trait;
use futures::{future, stream, StreamExt};
use providers::{Address, ContractReader, Feed, LedgerStorage, ProviderError, SubstrateApi};
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::sync::mpsc::UnboundedReceiver;

pub async fn recv(rx: &mut UnboundedReceiver<Vec<BalanceRecord>>) -> Vec<BalanceRecord> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no balance batch in time")
        .expect("sink closed")
}

pub fn token(
    chain: &str,
    slug: &str,
    symbol: &str,
    kind: TokenKind,
    id: Option<Value>,
) -> (String, TokenDescriptor) {
    let on_chain_id = id.map(|id| match kind {
        TokenKind::Bridged => OnChainId::Location(id),
        TokenKind::EvmContract | TokenKind::WasmContract => {
            OnChainId::Contract(id.as_str().unwrap_or_default().to_owned())
        }
        TokenKind::Native | TokenKind::Local => OnChainId::AssetId(id),
    });

    (
        slug.to_owned(),
        TokenDescriptor {
            slug: slug.to_owned(),
            symbol: symbol.to_owned(),
            origin_chain: chain.to_owned(),
            kind,
            on_chain_id,
            decimals: 12,
        },
    )
}

struct FeedGuard(Arc<AtomicUsize>);

impl FeedGuard {
    fn new(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Substrate client replaying scripted ticks. Feeds stay open after the
/// last tick, like live subscriptions.
#[derive(Default)]
pub struct MockChain {
    accounts: Vec<Vec<Value>>,
    pool_members: Option<Vec<Vec<Value>>>,
    ledgers: HashMap<String, Vec<Vec<Value>>>,
    foreign: HashMap<String, Vec<Vec<Value>>>,
    failing: HashSet<String>,
    stalling: HashSet<String>,
    ledger_calls: Mutex<Vec<(LedgerStorage, Value)>>,
    live: Arc<AtomicUsize>,
}

impl MockChain {
    pub fn with_accounts(mut self, ticks: Vec<Vec<Value>>) -> Self {
        self.accounts = ticks;
        self
    }

    pub fn with_pool_members(mut self, ticks: Vec<Vec<Value>>) -> Self {
        self.pool_members = Some(ticks);
        self
    }

    pub fn with_ledger(mut self, asset_id: Value, ticks: Vec<Vec<Value>>) -> Self {
        self.ledgers.insert(asset_id.to_string(), ticks);
        self
    }

    pub fn with_foreign(mut self, location: Value, ticks: Vec<Vec<Value>>) -> Self {
        self.foreign.insert(location.to_string(), ticks);
        self
    }

    /// One of `ready`, `accounts`, `pools`, `foreign`.
    pub fn failing(mut self, what: &str) -> Self {
        self.failing.insert(what.to_owned());
        self
    }

    pub fn failing_ledger(mut self, asset_id: Value) -> Self {
        self.failing.insert(format!("ledger:{asset_id}"));
        self
    }

    /// Subscriptions to this asset never resolve.
    pub fn stalling_ledger(mut self, asset_id: Value) -> Self {
        self.stalling.insert(format!("ledger:{asset_id}"));
        self
    }

    /// Subscriptions to this location never resolve.
    pub fn stalling_foreign(mut self, location: Value) -> Self {
        self.stalling.insert(format!("foreign:{location}"));
        self
    }

    pub fn ledger_calls(&self) -> Vec<(LedgerStorage, Value)> {
        self.ledger_calls.lock().unwrap().clone()
    }

    /// Feeds handed out and not dropped yet.
    pub fn live_feeds(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    async fn check(&self, what: &str) -> Result<(), ProviderError> {
        if self.stalling.contains(what) {
            future::pending::<()>().await;
        }

        if self.failing.contains(what) {
            return Err(ProviderError::Other(format!("{what} unavailable")));
        }

        Ok(())
    }

    fn feed(&self, ticks: Vec<Vec<Value>>) -> Feed {
        let guard = FeedGuard::new(&self.live);

        stream::iter(ticks)
            .chain(stream::pending())
            .map(move |tick| {
                let _ = &guard;
                tick
            })
            .boxed()
    }
}

#[async_trait]
impl SubstrateApi for MockChain {
    async fn ready(&self) -> Result<(), ProviderError> {
        self.check("ready").await
    }

    async fn subscribe_accounts(&self, _addresses: &[Address]) -> Result<Feed, ProviderError> {
        self.check("accounts").await?;
        Ok(self.feed(self.accounts.clone()))
    }

    fn has_pool_members(&self) -> bool {
        self.pool_members.is_some()
    }

    async fn subscribe_pool_members(&self, _addresses: &[Address]) -> Result<Feed, ProviderError> {
        self.check("pools").await?;

        match &self.pool_members {
            Some(ticks) => Ok(self.feed(ticks.clone())),
            None => Err(ProviderError::StorageUnavailable("nominationPools.poolMembers")),
        }
    }

    async fn subscribe_ledger(
        &self,
        storage: LedgerStorage,
        asset_id: &Value,
        _addresses: &[Address],
    ) -> Result<Feed, ProviderError> {
        self.ledger_calls
            .lock()
            .unwrap()
            .push((storage, asset_id.clone()));
        self.check(&format!("ledger:{asset_id}")).await?;

        let ticks = self
            .ledgers
            .get(&asset_id.to_string())
            .cloned()
            .unwrap_or_default();

        Ok(self.feed(ticks))
    }

    async fn subscribe_foreign_assets(
        &self,
        location: &Value,
        _addresses: &[Address],
    ) -> Result<Feed, ProviderError> {
        self.check("foreign").await?;
        self.check(&format!("foreign:{location}")).await?;

        let ticks = self
            .foreign
            .get(&location.to_string())
            .cloned()
            .unwrap_or_default();

        Ok(self.feed(ticks))
    }
}

/// Contract reader with fixed balances; unknown pairs read as zero.
#[derive(Default)]
pub struct MockContracts {
    balances: HashMap<(String, String), U256>,
    failing: HashSet<(String, String)>,
    calls: AtomicUsize,
}

impl MockContracts {
    pub fn with_balance(mut self, contract: &str, owner: &str, balance: u64) -> Self {
        self.balances
            .insert((contract.to_owned(), owner.to_owned()), U256::from(balance));
        self
    }

    pub fn failing(mut self, contract: &str, owner: &str) -> Self {
        self.failing.insert((contract.to_owned(), owner.to_owned()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractReader for MockContracts {
    async fn balance_of(&self, contract: &str, owner: &str) -> Result<U256, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let key = (contract.to_owned(), owner.to_owned());
        if self.failing.contains(&key) {
            return Err(ProviderError::Other("execution reverted".into()));
        }

        Ok(self.balances.get(&key).copied().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockClients {
    substrate: HashMap<String, Arc<MockChain>>,
    evm: HashMap<String, Arc<MockContracts>>,
    wasm: HashMap<String, Arc<MockContracts>>,
}

impl MockClients {
    pub fn with_substrate(mut self, chain: &str, api: Arc<MockChain>) -> Self {
        self.substrate.insert(chain.to_owned(), api);
        self
    }

    pub fn with_evm(mut self, chain: &str, reader: Arc<MockContracts>) -> Self {
        self.evm.insert(chain.to_owned(), reader);
        self
    }

    pub fn with_wasm(mut self, chain: &str, reader: Arc<MockContracts>) -> Self {
        self.wasm.insert(chain.to_owned(), reader);
        self
    }
}

impl ChainClients for MockClients {
    fn substrate(&self, chain: &str) -> Option<Arc<dyn SubstrateApi>> {
        self.substrate
            .get(chain)
            .map(|api| Arc::clone(api) as Arc<dyn SubstrateApi>)
    }

    fn evm(&self, chain: &str) -> Option<Arc<dyn ContractReader>> {
        self.evm
            .get(chain)
            .map(|reader| Arc::clone(reader) as Arc<dyn ContractReader>)
    }

    fn wasm(&self, chain: &str) -> Option<Arc<dyn ContractReader>> {
        self.wasm
            .get(chain)
            .map(|reader| Arc::clone(reader) as Arc<dyn ContractReader>)
    }
}
