use crate::{
    evm::{parse_address, ERC20_ABI, EVM_CHAINS},
    ContractReader, ProviderError, U256,
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use web3::{
    contract::{Contract, Options},
    transports::Http,
    Web3,
};

pub struct Provider {
    chain: String,
    pub single: Web3<Http>,
}

impl Provider {
    pub fn new(chain: &str, rpc_url: &str) -> Result<Self, ProviderError> {
        let transport = Http::new(rpc_url)?;

        Ok(Self {
            chain: chain.to_owned(),
            single: Web3::new(transport),
        })
    }
}

#[async_trait]
impl ContractReader for Provider {
    async fn balance_of(&self, contract: &str, owner: &str) -> Result<U256, ProviderError> {
        let token_address = parse_address(contract)?;
        let owner = parse_address(owner)?;
        let contract = Contract::from_json(self.single.eth(), token_address, ERC20_ABI)?;

        contract
            .query("balanceOf", (owner,), None, Options::default(), None)
            .await
            .map_err(|e| {
                log::debug!("{}: balanceOf {token_address:?} for {owner:?} failed", self.chain);
                e.into()
            })
    }
}

lazy_static::lazy_static! {
    pub static ref PROVIDERS: HashMap<String, Arc<Provider>> = {
        let mut providers = HashMap::new();

        for (chain, var) in EVM_CHAINS {
            let rpc_url = match std::env::var(var) {
                Ok(val) => val,
                Err(_) => continue,
            };

            match Provider::new(chain, &rpc_url) {
                Ok(provider) => {
                    providers.insert(chain.to_string(), Arc::new(provider));
                }
                Err(e) => log::warn!("{chain}: cannot create provider from `{var}`: {e}"),
            }
        }

        providers
    };
}
