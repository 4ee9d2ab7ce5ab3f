use super::BalanceAdapter;
use crate::{
    errors::{DecodeError, EngineError},
    raw::{decode, decode_account, key_by_address, AccountData, PoolMember},
    sink::SharedSink,
    types::{Address, BalanceRecord, ChainDescriptor, SubstrateDetail, U256},
};
use async_trait::async_trait;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use providers::SubstrateApi;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

/// Native token from `system.account`, with nomination pool stake folded in.
pub struct NativeAdapter {
    chain: String,
    token_slug: String,
    api: Arc<dyn SubstrateApi>,
    addresses: Vec<Address>,
    pool_overlay: bool,
}

enum Tick {
    Accounts(Vec<Value>),
    Members(Vec<Value>),
}

type Accounts = HashMap<Address, Result<AccountData, DecodeError>>;
type Members = HashMap<Address, Result<Option<PoolMember>, DecodeError>>;

/// `locked = reserved + miscFrozen + pooled`, `free = total - locked`
/// where the total counts the pooled stake too.
pub(crate) fn normalize_native(
    address: &str,
    token_slug: &str,
    account: &AccountData,
    pooled: U256,
) -> BalanceRecord {
    let reserved = account.reserved.0;
    let misc_frozen = account.misc_frozen.0;

    let locked = reserved.saturating_add(misc_frozen).saturating_add(pooled);
    let total = account
        .free
        .0
        .saturating_add(reserved)
        .saturating_add(pooled);

    BalanceRecord::new(address, token_slug, total.saturating_sub(locked), locked).with_detail(
        SubstrateDetail {
            reserved,
            misc_frozen,
            fee_frozen: account.fee_frozen.0,
        },
    )
}

impl NativeAdapter {
    pub fn new(
        chain: &ChainDescriptor,
        api: Arc<dyn SubstrateApi>,
        addresses: Vec<Address>,
        pool_overlay: bool,
    ) -> Self {
        Self {
            chain: chain.slug.clone(),
            token_slug: chain.native_token.clone(),
            api,
            addresses,
            pool_overlay,
        }
    }

    fn key_members(&self, values: &[Value]) -> Members {
        key_by_address(&self.addresses, values, decode::<PoolMember>)
            .into_iter()
            .map(|(address, member)| {
                let member = member.map(|m| Some(m).filter(|m| *m != PoolMember::default()));
                (address, member)
            })
            .collect()
    }

    fn combine(&self, accounts: &Accounts, members: &Members) -> Vec<BalanceRecord> {
        self.addresses
            .iter()
            .map(|address| match (accounts.get(address), members.get(address)) {
                (Some(Ok(account)), Some(Ok(member))) => {
                    let pooled = member.as_ref().map(PoolMember::pooled).unwrap_or_default();

                    normalize_native(address, &self.token_slug, account, pooled)
                }
                (Some(Ok(_)), Some(Err(e))) => {
                    log::warn!("{}: pool membership of {address} unreadable: {e}", self.chain);
                    BalanceRecord::fallback(address, &self.token_slug)
                }
                (Some(Err(e)), _) => {
                    log::warn!("{}: account of {address} replaced by zero: {e}", self.chain);
                    BalanceRecord::fallback(address, &self.token_slug)
                }
                _ => BalanceRecord::fallback(address, &self.token_slug),
            })
            .collect()
    }

    async fn members_feed(&self) -> Result<BoxStream<'static, Tick>, EngineError> {
        if self.pool_overlay && self.api.has_pool_members() {
            let feed = self.api.subscribe_pool_members(&self.addresses).await?;
            return Ok(feed.map(Tick::Members).boxed());
        }

        let nobody = vec![Value::Null; self.addresses.len()];
        Ok(stream::iter([Tick::Members(nobody)]).boxed())
    }
}

#[async_trait]
impl BalanceAdapter for NativeAdapter {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn run(self: Box<Self>, sink: SharedSink) -> Result<(), EngineError> {
        if self.addresses.is_empty() {
            return Ok(());
        }

        self.api.ready().await?;

        let accounts_feed = self
            .api
            .subscribe_accounts(&self.addresses)
            .await?
            .map(Tick::Accounts)
            .boxed();
        let members_feed = self.members_feed().await?;

        let mut ticks = stream::select(accounts_feed, members_feed);
        let mut accounts: Option<Accounts> = None;
        let mut members: Option<Members> = None;

        while let Some(tick) = ticks.next().await {
            match tick {
                Tick::Accounts(values) => {
                    accounts = Some(key_by_address(&self.addresses, &values, decode_account))
                }
                Tick::Members(values) => members = Some(self.key_members(&values)),
            }

            if let (Some(accounts), Some(members)) = (&accounts, &members) {
                sink.emit(self.combine(accounts, members));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{normalize_native, NativeAdapter};
    use crate::{
        adapters::BalanceAdapter,
        mock::{recv, MockChain},
        raw::{AccountData, RawBalance},
        sink::channel_sink,
        types::{BalanceState, ChainDescriptor, U256},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc::unbounded_channel;

    fn balance(v: u64) -> RawBalance {
        RawBalance(U256::from(v))
    }

    #[test]
    fn pooled_stake_is_locked() {
        let account = AccountData {
            free: balance(100),
            reserved: balance(20),
            misc_frozen: balance(30),
            fee_frozen: balance(30),
        };

        let record = normalize_native("alice", "polkadot-NATIVE-DOT", &account, U256::from(50));

        assert_eq!(record.locked, U256::from(100));
        assert_eq!(record.free, U256::from(70));
        assert_eq!(record.total(), U256::from(170));
        assert_eq!(record.substrate_detail.unwrap().fee_frozen, U256::from(30));
    }

    #[test]
    fn frozen_above_free_clamps_to_zero() {
        let account = AccountData {
            free: balance(10),
            misc_frozen: balance(40),
            ..Default::default()
        };

        let record = normalize_native("alice", "dot", &account, U256::zero());

        assert_eq!(record.free, U256::zero());
        assert_eq!(record.locked, U256::from(40));
    }

    fn polkadot() -> ChainDescriptor {
        let mut chain = ChainDescriptor::new("polkadot", "polkadot-NATIVE-DOT");
        chain.capabilities.pool_staking = true;
        chain
    }

    #[tokio::test]
    async fn pool_overlay_follows_addresses() {
        let api = MockChain::default()
            .with_accounts(vec![vec![
                json!({ "data": { "free": 100, "reserved": 0, "miscFrozen": 0, "feeFrozen": 0 } }),
                json!({ "data": { "free": 200, "reserved": 0, "miscFrozen": 0, "feeFrozen": 0 } }),
            ]])
            .with_pool_members(vec![vec![
                json!(null),
                json!({ "points": 50, "unbondingEras": {} }),
            ]]);
        let (tx, mut rx) = unbounded_channel();

        let adapter = NativeAdapter::new(
            &polkadot(),
            Arc::new(api),
            vec!["A".into(), "B".into()],
            true,
        );
        let task = tokio::spawn(Box::new(adapter).run(channel_sink(tx)));

        let batch = recv(&mut rx).await;

        assert_eq!(batch[0].address, "A");
        assert_eq!((batch[0].free, batch[0].locked), (U256::from(100), U256::zero()));
        assert_eq!(batch[1].address, "B");
        assert_eq!((batch[1].free, batch[1].locked), (U256::from(200), U256::from(50)));
        assert_eq!(batch[1].total(), U256::from(250));

        task.abort();
    }

    #[tokio::test]
    async fn no_pool_ledger_means_no_membership() {
        let api = MockChain::default()
            .with_accounts(vec![vec![json!({ "free": 100, "frozen": 10 })]])
            .with_pool_members(vec![vec![json!({ "points": 50 })]]);
        let (tx, mut rx) = unbounded_channel();

        let adapter = NativeAdapter::new(&polkadot(), Arc::new(api), vec!["A".into()], false);
        let task = tokio::spawn(Box::new(adapter).run(channel_sink(tx)));

        let batch = recv(&mut rx).await;

        assert_eq!((batch[0].free, batch[0].locked), (U256::from(90), U256::from(10)));

        task.abort();
    }

    #[tokio::test]
    async fn unreadable_membership_falls_back() {
        let api = MockChain::default()
            .with_accounts(vec![vec![json!({ "free": 100 }), json!({ "free": 200 })]])
            .with_pool_members(vec![vec![json!({ "points": "x" }), json!({ "points": 5 })]]);
        let (tx, mut rx) = unbounded_channel();

        let adapter = NativeAdapter::new(
            &polkadot(),
            Arc::new(api),
            vec!["A".into(), "B".into()],
            true,
        );
        let task = tokio::spawn(Box::new(adapter).run(channel_sink(tx)));

        let batch = recv(&mut rx).await;

        assert_eq!(batch[0].state, BalanceState::Fallback);
        assert_eq!(batch[0].total(), U256::zero());
        assert_eq!(batch[1].state, BalanceState::Ready);
        assert_eq!((batch[1].free, batch[1].locked), (U256::from(200), U256::from(5)));

        task.abort();
    }

    #[tokio::test]
    async fn anomalies_only_affect_their_address() {
        let api = MockChain::default()
            .with_accounts(vec![vec![json!({ "free": -5 }), json!({ "free": "0x10" })]]);
        let (tx, mut rx) = unbounded_channel();

        let adapter = NativeAdapter::new(
            &ChainDescriptor::new("kusama", "kusama-NATIVE-KSM"),
            Arc::new(api),
            vec!["A".into(), "B".into()],
            false,
        );
        let task = tokio::spawn(Box::new(adapter).run(channel_sink(tx)));

        let batch = recv(&mut rx).await;

        assert_eq!(batch[0].state, BalanceState::Fallback);
        assert_eq!(batch[0].total(), U256::zero());
        assert_eq!(batch[1].state, BalanceState::Ready);
        assert_eq!(batch[1].free, U256::from(16));

        task.abort();
    }

    #[tokio::test]
    async fn every_tick_re_emits() {
        let api = MockChain::default().with_accounts(vec![
            vec![json!({ "free": 1 })],
            vec![json!({ "free": 2 })],
        ]);
        let (tx, mut rx) = unbounded_channel();

        let adapter = NativeAdapter::new(
            &ChainDescriptor::new("kusama", "kusama-NATIVE-KSM"),
            Arc::new(api),
            vec!["A".into()],
            false,
        );
        let task = tokio::spawn(Box::new(adapter).run(channel_sink(tx)));

        let mut last = recv(&mut rx).await;
        while last[0].free != U256::from(2) {
            last = recv(&mut rx).await;
        }

        assert_eq!(last[0].token_slug, "kusama-NATIVE-KSM");

        task.abort();
    }

    #[tokio::test]
    async fn setup_failure_is_reported() {
        let api = MockChain::default().failing("accounts");
        let (tx, _rx) = unbounded_channel();

        let adapter = NativeAdapter::new(
            &ChainDescriptor::new("kusama", "kusama-NATIVE-KSM"),
            Arc::new(api),
            vec!["A".into()],
            false,
        );

        assert!(Box::new(adapter).run(channel_sink(tx)).await.is_err());
    }
}
