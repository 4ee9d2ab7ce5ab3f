use super::BalanceAdapter;
use crate::{
    errors::EngineError,
    router::{chain_tokens, ContractStandard},
    sink::SharedSink,
    types::{Address, BalanceRecord, ChainDescriptor, TokenMap, U256},
};
use async_trait::async_trait;
use futures::future::join_all;
use providers::ContractReader;
use std::{sync::Arc, time::Duration};
use tokio::time::{self, MissedTickBehavior};

const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Balances that can only be read through a contract call, polled for
/// every (contract, address) pair.
pub struct ContractPoller {
    chain: String,
    standard: ContractStandard,
    reader: Arc<dyn ContractReader>,
    addresses: Vec<Address>,
    tokens: Vec<(String, String)>,
    interval: Duration,
}

impl ContractPoller {
    pub fn new(
        chain: &ChainDescriptor,
        standard: ContractStandard,
        tokens: &TokenMap,
        reader: Arc<dyn ContractReader>,
        addresses: Vec<Address>,
        interval: Duration,
    ) -> Self {
        let tokens = chain_tokens(chain, tokens, &[standard.token_kind()])
            .into_iter()
            .filter_map(|t| t.contract().map(|c| (t.slug.clone(), c.to_owned())))
            .collect();

        Self {
            chain: chain.slug.clone(),
            standard,
            reader,
            addresses,
            tokens,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// One read per pair. Failed reads become zero records so the token
    /// stays visible.
    async fn poll(&self) -> Vec<BalanceRecord> {
        let pairs = self
            .tokens
            .iter()
            .flat_map(|token| self.addresses.iter().map(move |address| (token, address)));

        join_all(pairs.map(|((slug, contract), address)| async move {
            match self.reader.balance_of(contract, address).await {
                Ok(free) => BalanceRecord::new(address, slug, free, U256::zero()),
                Err(e) => {
                    log::warn!(
                        "{}: {} balance of {address} unreadable: {e}",
                        self.chain,
                        slug
                    );
                    BalanceRecord::fallback(address, slug)
                }
            }
        }))
        .await
    }
}

#[async_trait]
impl BalanceAdapter for ContractPoller {
    fn name(&self) -> &'static str {
        match self.standard {
            ContractStandard::Evm => "evm-contracts",
            ContractStandard::Wasm => "wasm-contracts",
        }
    }

    async fn run(self: Box<Self>, sink: SharedSink) -> Result<(), EngineError> {
        if self.tokens.is_empty() || self.addresses.is_empty() {
            return Ok(());
        }

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            sink.emit(self.poll().await);
        }
    }
}
