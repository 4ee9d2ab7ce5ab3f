pub mod general;

pub use general::{Provider, PROVIDERS};

use crate::{ProviderError, H160};
use std::str::FromStr;

pub const ERC20_ABI: &[u8] = include_bytes!("../../abi/ERC20.json");

/// EVM chains an RPC endpoint can be configured for, with the environment
/// variable holding the endpoint.
pub const EVM_CHAINS: &[(&str, &str)] = &[
    ("ethereum", "ETHEREUM_RPC"),
    ("binance", "BSC_RPC"),
    ("moonbeam", "MOONBEAM_RPC"),
    ("moonriver", "MOONRIVER_RPC"),
    ("moonbase", "MOONBASE_RPC"),
    ("astarEvm", "ASTAR_EVM_RPC"),
    ("shidenEvm", "SHIDEN_EVM_RPC"),
    ("crabEvm", "CRAB_EVM_RPC"),
    ("pangolinEvm", "PANGOLIN_EVM_RPC"),
];

pub fn is_evm_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn parse_address(s: &str) -> Result<H160, ProviderError> {
    if !is_evm_address(s) {
        return Err(ProviderError::InvalidAddress(s.to_owned()));
    }

    H160::from_str(&s[2..]).map_err(|_| ProviderError::InvalidAddress(s.to_owned()))
}
