use super::{Address, U256};
use serde::Serialize;
use serde_with::{serde_as, skip_serializing_none, DisplayFromStr};

#[derive(Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceState {
    Ready,
    /// Zero-value stand-in for an entry that could not be read or decoded.
    Fallback,
}

#[serde_as]
#[derive(Serialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubstrateDetail {
    #[serde_as(as = "DisplayFromStr")]
    pub reserved: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub misc_frozen: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub fee_frozen: U256,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub address: Address,
    pub token_slug: String,
    #[serde_as(as = "DisplayFromStr")]
    pub free: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub locked: U256,
    pub state: BalanceState,
    pub substrate_detail: Option<SubstrateDetail>,
}

impl BalanceRecord {
    pub fn new(address: &str, token_slug: &str, free: U256, locked: U256) -> Self {
        Self {
            address: address.to_owned(),
            token_slug: token_slug.to_owned(),
            free,
            locked,
            state: BalanceState::Ready,
            substrate_detail: None,
        }
    }

    pub fn fallback(address: &str, token_slug: &str) -> Self {
        Self {
            state: BalanceState::Fallback,
            ..Self::new(address, token_slug, U256::zero(), U256::zero())
        }
    }

    pub fn with_detail(mut self, detail: SubstrateDetail) -> Self {
        self.substrate_detail = Some(detail);
        self
    }

    pub fn total(&self) -> U256 {
        self.free.saturating_add(self.locked)
    }
}
