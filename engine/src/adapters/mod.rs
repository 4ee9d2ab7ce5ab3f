mod bridged;
mod contract;
mod ledger;
mod native;

pub use bridged::BridgedAssetAdapter;
pub use contract::ContractPoller;
pub use ledger::LedgerAdapter;
pub use native::NativeAdapter;

use crate::{
    config::EngineConfig,
    errors::{DecodeError, EngineError},
    raw::key_by_address,
    router::{AdapterSpec, ContractStandard},
    service::ChainClients,
    sink::SharedSink,
    types::{
        Address, AddressBook, BalanceRecord, ChainDescriptor, SubstrateDetail, TokenMap, U256,
    },
};
use async_trait::async_trait;
use futures::{
    future::BoxFuture,
    stream::{FuturesUnordered, SelectAll},
    StreamExt,
};
use providers::{Feed, ProviderError, SubstrateApi};
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait BalanceAdapter: Send {
    fn name(&self) -> &'static str;

    /// Opens the adapter's feeds and forwards normalized records to `sink`
    /// until the feeds end. Errors are setup failures only; anything that
    /// goes wrong afterwards becomes a fallback record.
    async fn run(self: Box<Self>, sink: SharedSink) -> Result<(), EngineError>;
}

pub struct AdapterContext<'a> {
    pub chain: &'a ChainDescriptor,
    pub tokens: &'a TokenMap,
    pub addresses: &'a AddressBook,
    pub clients: &'a dyn ChainClients,
    pub config: &'a EngineConfig,
}

impl<'a> AdapterContext<'a> {
    fn substrate(&self) -> Result<Arc<dyn SubstrateApi>, EngineError> {
        self.clients
            .substrate(&self.chain.slug)
            .ok_or_else(|| EngineError::MissingClient {
                chain: self.chain.slug.clone(),
                kind: "substrate",
            })
    }
}

pub fn build(
    spec: AdapterSpec,
    ctx: &AdapterContext,
) -> Result<Box<dyn BalanceAdapter>, EngineError> {
    let chain = ctx.chain;
    let chain_addresses = ctx.addresses.for_chain(chain).to_vec();

    let adapter: Box<dyn BalanceAdapter> = match spec {
        AdapterSpec::Native { pool_overlay } => Box::new(NativeAdapter::new(
            chain,
            ctx.substrate()?,
            chain_addresses,
            pool_overlay,
        )),
        AdapterSpec::Ledger(ledger) => Box::new(LedgerAdapter::new(
            chain,
            ledger,
            ctx.tokens,
            ctx.substrate()?,
            chain_addresses,
            &ctx.config.privacy_symbol_prefix,
        )),
        AdapterSpec::Bridged => Box::new(BridgedAssetAdapter::new(
            chain,
            ctx.tokens,
            ctx.substrate()?,
            chain_addresses,
        )),
        AdapterSpec::Contract(standard) => {
            let (reader, addresses, kind) = match standard {
                ContractStandard::Evm => {
                    (ctx.clients.evm(&chain.slug), &ctx.addresses.evm, "evm")
                }
                ContractStandard::Wasm => (
                    ctx.clients.wasm(&chain.slug),
                    &ctx.addresses.substrate,
                    "wasm",
                ),
            };
            let reader = reader.ok_or_else(|| EngineError::MissingClient {
                chain: chain.slug.clone(),
                kind,
            })?;

            Box::new(ContractPoller::new(
                chain,
                standard,
                ctx.tokens,
                reader,
                addresses.clone(),
                ctx.config.contract_poll_interval,
            ))
        }
    };

    Ok(adapter)
}

/// Balance split of one storage entry, not yet bound to an address.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Normalized {
    pub free: U256,
    pub locked: U256,
    pub detail: Option<SubstrateDetail>,
}

impl Normalized {
    /// Entry of a ledger with no partial freezes.
    pub fn all_or_nothing(balance: U256, frozen: bool) -> Self {
        let (free, locked) = if frozen {
            (U256::zero(), balance)
        } else {
            (balance, U256::zero())
        };

        Self {
            free,
            locked,
            detail: None,
        }
    }

    pub fn into_record(self, address: &str, token_slug: &str) -> BalanceRecord {
        let record = BalanceRecord::new(address, token_slug, self.free, self.locked);

        match self.detail {
            Some(detail) => record.with_detail(detail),
            None => record,
        }
    }
}

/// Pending subscription of one token's feed.
type TokenSubscription<'a> = BoxFuture<'a, (String, Result<Feed, ProviderError>)>;

/// Forwards ticks of per-token feeds, one batch per tick. Each feed is
/// forwarded as soon as its own subscription resolves. Entries that fail to
/// decode are replaced by fallback records.
///
/// Fails only when every subscription failed.
async fn forward_token_feeds<N>(
    name: &'static str,
    chain: &str,
    addresses: &[Address],
    subscriptions: Vec<TokenSubscription<'_>>,
    sink: &SharedSink,
    normalize: N,
) -> Result<(), EngineError>
where
    N: Fn(&Value) -> Result<Normalized, DecodeError> + Send + Sync,
{
    let mut pending: FuturesUnordered<_> = subscriptions.into_iter().collect();
    let mut merged = SelectAll::new();
    let mut started = 0usize;

    loop {
        tokio::select! {
            Some((slug, feed)) = pending.next(), if !pending.is_empty() => match feed {
                Ok(feed) => {
                    started += 1;
                    merged.push(feed.map(move |values| (slug.clone(), values)).boxed());
                }
                Err(e) => log::warn!("{chain}: {name} {slug} subscription failed: {e}"),
            },
            Some((slug, values)) = merged.next(), if !merged.is_empty() => {
                emit_token_tick(name, addresses, &slug, &values, sink, &normalize);
            }
            else => break,
        }

        if started == 0 && pending.is_empty() {
            return Err(EngineError::NoFeedStarted(name));
        }
    }

    Ok(())
}

fn emit_token_tick<N>(
    name: &str,
    addresses: &[Address],
    slug: &str,
    values: &[Value],
    sink: &SharedSink,
    normalize: &N,
) where
    N: Fn(&Value) -> Result<Normalized, DecodeError>,
{
    let keyed = key_by_address(addresses, values, normalize);

    let records = addresses
        .iter()
        .map(|address| match keyed.get(address) {
            Some(Ok(normalized)) => normalized.clone().into_record(address, slug),
            Some(Err(e)) => {
                log::warn!("{name}: {slug} entry for {address} replaced by zero: {e}");
                BalanceRecord::fallback(address, slug)
            }
            None => BalanceRecord::fallback(address, slug),
        })
        .collect();

    sink.emit(records);
}
