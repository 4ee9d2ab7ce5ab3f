use anyhow::{Context, Error};
use balance_engine::types::{ChainDescriptor, TokenMap};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registry {
    pub chains: Vec<ChainDescriptor>,
    pub tokens: TokenMap,
}

impl Registry {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read registry {}", path.display()))?;

        Self::parse(&raw).with_context(|| format!("invalid registry {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
