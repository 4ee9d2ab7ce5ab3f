use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Native,
    Local,
    Bridged,
    WasmContract,
    EvmContract,
}

/// Where the token's balance is found on chain.
#[derive(Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub enum OnChainId {
    /// Ledger key: a numeric asset id or a currency id object.
    AssetId(Value),
    /// Cross-chain location of a bridged asset.
    Location(Value),
    Contract(String),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescriptor {
    pub slug: String,
    pub symbol: String,
    pub origin_chain: String,
    pub kind: TokenKind,
    pub on_chain_id: Option<OnChainId>,
    #[serde(default)]
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn asset_id(&self) -> Option<&Value> {
        match &self.on_chain_id {
            Some(OnChainId::AssetId(id)) => Some(id),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&Value> {
        match &self.on_chain_id {
            Some(OnChainId::Location(location)) => Some(location),
            _ => None,
        }
    }

    pub fn contract(&self) -> Option<&str> {
        match &self.on_chain_id {
            Some(OnChainId::Contract(address)) => Some(address),
            _ => None,
        }
    }
}
