use super::{forward_token_feeds, BalanceAdapter, Normalized};
use crate::{
    errors::{DecodeError, EngineError},
    raw::{decode, AssetAccount, TokenAccount},
    router::chain_tokens,
    sink::SharedSink,
    types::{Address, ChainDescriptor, LocalLedger, SubstrateDetail, TokenKind, TokenMap},
};
use async_trait::async_trait;
use futures::FutureExt;
use providers::SubstrateApi;
use serde_json::Value;
use std::sync::Arc;

/// Local tokens of a chain, one ledger subscription per token.
pub struct LedgerAdapter {
    chain: String,
    ledger: LocalLedger,
    api: Arc<dyn SubstrateApi>,
    addresses: Vec<Address>,
    tokens: Vec<(String, Value)>,
}

impl LedgerAdapter {
    pub fn new(
        chain: &ChainDescriptor,
        ledger: LocalLedger,
        tokens: &TokenMap,
        api: Arc<dyn SubstrateApi>,
        addresses: Vec<Address>,
        privacy_prefix: &str,
    ) -> Self {
        let kinds: &[TokenKind] = if ledger.includes_native() {
            &[TokenKind::Local, TokenKind::Native]
        } else {
            &[TokenKind::Local]
        };

        let tokens = chain_tokens(chain, tokens, kinds)
            .into_iter()
            .filter(|t| {
                let private = chain.capabilities.zk_assets
                    && !privacy_prefix.is_empty()
                    && t.symbol.starts_with(privacy_prefix);

                if private {
                    log::debug!("{}: skipping private asset {}", chain.slug, t.slug);
                }

                !private
            })
            .filter_map(|t| match t.asset_id() {
                Some(id) => Some((t.slug.clone(), id.clone())),
                None => {
                    log::warn!("{}: token {} has no asset id", chain.slug, t.slug);
                    None
                }
            })
            .collect();

        Self {
            chain: chain.slug.clone(),
            ledger,
            api,
            addresses,
            tokens,
        }
    }

    fn normalize(&self) -> fn(&Value) -> Result<Normalized, DecodeError> {
        match self.ledger {
            LocalLedger::Tokens | LocalLedger::Currencies { .. } => normalize_token_account,
            LocalLedger::Assets => normalize_asset_account,
        }
    }
}

/// `free` of these ledgers is the total balance.
pub(crate) fn normalize_token_account(value: &Value) -> Result<Normalized, DecodeError> {
    let account: TokenAccount = decode(value)?;
    let frozen = account.frozen.0;
    let reserved = account.reserved.0;

    Ok(Normalized {
        free: account.free.0.saturating_sub(frozen),
        locked: frozen.saturating_add(reserved),
        detail: Some(SubstrateDetail {
            reserved,
            misc_frozen: frozen,
            ..Default::default()
        }),
    })
}

pub(crate) fn normalize_asset_account(value: &Value) -> Result<Normalized, DecodeError> {
    let account: AssetAccount = decode(value)?;

    Ok(Normalized::all_or_nothing(
        account.balance.0,
        account.frozen(),
    ))
}

#[async_trait]
impl BalanceAdapter for LedgerAdapter {
    fn name(&self) -> &'static str {
        match self.ledger {
            LocalLedger::Tokens => "tokens-ledger",
            LocalLedger::Currencies { .. } => "currencies-ledger",
            LocalLedger::Assets => "assets-ledger",
        }
    }

    async fn run(self: Box<Self>, sink: SharedSink) -> Result<(), EngineError> {
        if self.tokens.is_empty() || self.addresses.is_empty() {
            return Ok(());
        }

        self.api.ready().await?;

        let storage = self.ledger.storage();
        log::debug!(
            "{}: subscribing {} tokens from {}",
            self.chain,
            self.tokens.len(),
            storage.as_str()
        );

        let (api, addresses) = (&self.api, &self.addresses);
        let subscriptions = self
            .tokens
            .iter()
            .map(|(slug, asset_id)| {
                async move {
                    let feed = api.subscribe_ledger(storage, asset_id, addresses).await;

                    (slug.clone(), feed)
                }
                .boxed()
            })
            .collect();

        forward_token_feeds(
            self.name(),
            &self.chain,
            &self.addresses,
            subscriptions,
            &sink,
            self.normalize(),
        )
        .await
    }
}
