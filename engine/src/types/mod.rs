pub use providers::{Address, U256};

pub mod balance;
pub mod chain;
pub mod token;
pub use balance::*;
pub use chain::*;
pub use token::*;

use std::collections::HashMap;

pub type TokenMap = HashMap<String, TokenDescriptor>;

/// Caller addresses split by account format, each half keeping the
/// caller's order.
#[derive(Debug, Default, Clone)]
pub struct AddressBook {
    pub substrate: Vec<Address>,
    pub evm: Vec<Address>,
}

impl AddressBook {
    pub fn new(addresses: &[Address]) -> Self {
        let (evm, substrate): (Vec<Address>, Vec<Address>) = addresses
            .iter()
            .cloned()
            .partition(|a| providers::evm::is_evm_address(a));

        Self { substrate, evm }
    }

    /// Addresses holding accounts in the chain's own storage.
    pub fn for_chain(&self, chain: &ChainDescriptor) -> &[Address] {
        if chain.capabilities.h160_accounts {
            &self.evm
        } else {
            &self.substrate
        }
    }
}
