use super::{forward_token_feeds, ledger::normalize_asset_account, BalanceAdapter};
use crate::{
    errors::EngineError,
    router::chain_tokens,
    sink::SharedSink,
    types::{Address, ChainDescriptor, TokenKind, TokenMap},
};
use async_trait::async_trait;
use futures::FutureExt;
use providers::SubstrateApi;
use serde_json::Value;
use std::sync::Arc;

/// Bridged tokens, read from the foreign asset ledger by location.
pub struct BridgedAssetAdapter {
    chain: String,
    api: Arc<dyn SubstrateApi>,
    addresses: Vec<Address>,
    tokens: Vec<(String, Value)>,
}

impl BridgedAssetAdapter {
    pub fn new(
        chain: &ChainDescriptor,
        tokens: &TokenMap,
        api: Arc<dyn SubstrateApi>,
        addresses: Vec<Address>,
    ) -> Self {
        let tokens = chain_tokens(chain, tokens, &[TokenKind::Bridged])
            .into_iter()
            .filter_map(|t| t.location().map(|location| (t.slug.clone(), location.clone())))
            .collect();

        Self {
            chain: chain.slug.clone(),
            api,
            addresses,
            tokens,
        }
    }
}

#[async_trait]
impl BalanceAdapter for BridgedAssetAdapter {
    fn name(&self) -> &'static str {
        "bridged-assets"
    }

    async fn run(self: Box<Self>, sink: SharedSink) -> Result<(), EngineError> {
        if self.tokens.is_empty() || self.addresses.is_empty() {
            return Ok(());
        }

        self.api.ready().await?;

        let (api, addresses) = (&self.api, &self.addresses);
        let subscriptions = self
            .tokens
            .iter()
            .map(|(slug, location)| {
                async move {
                    let feed = api.subscribe_foreign_assets(location, addresses).await;

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
            normalize_asset_account,
        )
        .await
    }
}
