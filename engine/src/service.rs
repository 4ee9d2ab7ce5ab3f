use crate::{
    adapters::{self, AdapterContext, BalanceAdapter},
    config::EngineConfig,
    handle::SubscriptionHandle,
    router::route,
    sink::SharedSink,
    types::{Address, AddressBook, ChainDescriptor, TokenMap},
};
use providers::{ContractReader, SubstrateApi};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Lookup of the clients connected to each chain, keyed by chain slug.
pub trait ChainClients: Send + Sync {
    fn substrate(&self, chain: &str) -> Option<Arc<dyn SubstrateApi>>;
    fn evm(&self, chain: &str) -> Option<Arc<dyn ContractReader>>;
    fn wasm(&self, chain: &str) -> Option<Arc<dyn ContractReader>>;
}

pub struct BalanceService {
    clients: Arc<dyn ChainClients>,
    config: EngineConfig,
}

impl BalanceService {
    pub fn new(clients: Arc<dyn ChainClients>, config: EngineConfig) -> Self {
        Self { clients, config }
    }

    /// Starts every adapter `chain` needs and returns their joint teardown.
    ///
    /// Returns as soon as the adapters are spawned. Adapters that cannot be
    /// built or fail during setup are logged and skipped. Outside a tokio
    /// runtime nothing is started and the handle is inert.
    pub fn start(
        &self,
        addresses: &[Address],
        chain: &ChainDescriptor,
        tokens: &TokenMap,
        sink: SharedSink,
    ) -> SubscriptionHandle {
        self.start_chain(&AddressBook::new(addresses), chain, tokens, &sink)
    }

    /// `start` for each active chain in `chains`.
    pub fn start_all(
        &self,
        addresses: &[Address],
        chains: &[ChainDescriptor],
        tokens: &TokenMap,
        sink: SharedSink,
    ) -> SubscriptionHandle {
        let book = AddressBook::new(addresses);

        SubscriptionHandle::composite(
            chains
                .iter()
                .filter(|chain| chain.active)
                .map(|chain| self.start_chain(&book, chain, tokens, &sink))
                .collect(),
        )
    }

    fn start_chain(
        &self,
        book: &AddressBook,
        chain: &ChainDescriptor,
        tokens: &TokenMap,
        sink: &SharedSink,
    ) -> SubscriptionHandle {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("{}: no adapters started: {e}", chain.slug);
                return SubscriptionHandle::noop();
            }
        };

        let ctx = AdapterContext {
            chain,
            tokens,
            addresses: book,
            clients: self.clients.as_ref(),
            config: &self.config,
        };

        let handles = route(chain, tokens)
            .into_iter()
            .filter_map(|spec| match adapters::build(spec, &ctx) {
                Ok(adapter) => Some(spawn(&runtime, &chain.slug, adapter, Arc::clone(sink))),
                Err(e) => {
                    log::warn!("{}: {} not started: {e}", chain.slug, spec.name());
                    None
                }
            })
            .collect::<Vec<_>>();

        log::debug!("{}: {} adapters started", chain.slug, handles.len());

        SubscriptionHandle::composite(handles)
    }
}

fn spawn(
    runtime: &Handle,
    chain: &str,
    adapter: Box<dyn BalanceAdapter>,
    sink: SharedSink,
) -> SubscriptionHandle {
    let chain = chain.to_owned();
    let name = adapter.name();

    SubscriptionHandle::from_task(runtime.spawn(async move {
        match adapter.run(sink).await {
            Ok(()) => log::debug!("{chain}: {name} finished"),
            Err(e) => log::warn!("{chain}: {name} failed to start: {e}"),
        }
    }))
}
