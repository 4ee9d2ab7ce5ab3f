use crate::types::{ChainDescriptor, LocalLedger, TokenDescriptor, TokenKind, TokenMap};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ContractStandard {
    Evm,
    Wasm,
}

impl ContractStandard {
    pub fn token_kind(&self) -> TokenKind {
        match self {
            ContractStandard::Evm => TokenKind::EvmContract,
            ContractStandard::Wasm => TokenKind::WasmContract,
        }
    }
}

/// Adapter selected for a chain.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AdapterSpec {
    Native { pool_overlay: bool },
    Ledger(LocalLedger),
    Bridged,
    Contract(ContractStandard),
}

impl AdapterSpec {
    pub fn name(&self) -> &'static str {
        match self {
            AdapterSpec::Native { .. } => "native",
            AdapterSpec::Ledger(LocalLedger::Tokens) => "tokens-ledger",
            AdapterSpec::Ledger(LocalLedger::Currencies { .. }) => "currencies-ledger",
            AdapterSpec::Ledger(LocalLedger::Assets) => "assets-ledger",
            AdapterSpec::Bridged => "bridged-assets",
            AdapterSpec::Contract(ContractStandard::Evm) => "evm-contracts",
            AdapterSpec::Contract(ContractStandard::Wasm) => "wasm-contracts",
        }
    }
}

/// Tokens of `chain` whose kind is one of `kinds`, ordered by slug.
pub fn chain_tokens(
    chain: &ChainDescriptor,
    tokens: &TokenMap,
    kinds: &[TokenKind],
) -> Vec<TokenDescriptor> {
    let mut selected: Vec<TokenDescriptor> = tokens
        .values()
        .filter(|t| t.origin_chain == chain.slug && kinds.contains(&t.kind))
        .cloned()
        .collect();

    selected.sort_by(|a, b| a.slug.cmp(&b.slug));
    selected
}

fn has_tokens(chain: &ChainDescriptor, tokens: &TokenMap, kind: TokenKind) -> bool {
    tokens
        .values()
        .any(|t| t.origin_chain == chain.slug && t.kind == kind)
}

/// Adapters needed to cover every balance of `chain`. Several may apply.
pub fn route(chain: &ChainDescriptor, tokens: &TokenMap) -> Vec<AdapterSpec> {
    let capabilities = &chain.capabilities;
    let mut specs = vec![];

    let native_in_ledger = capabilities
        .local_ledger
        .map(|l| l.includes_native())
        .unwrap_or_default();

    if capabilities.native_ledger && !native_in_ledger {
        specs.push(AdapterSpec::Native {
            pool_overlay: capabilities.pool_staking,
        });
    }

    if let Some(ledger) = capabilities.local_ledger {
        specs.push(AdapterSpec::Ledger(ledger));
    }

    if capabilities.bridged_assets {
        specs.push(AdapterSpec::Bridged);
    }

    if chain.evm_compatible && has_tokens(chain, tokens, TokenKind::EvmContract) {
        specs.push(AdapterSpec::Contract(ContractStandard::Evm));
    }

    if capabilities.wasm_contracts && has_tokens(chain, tokens, TokenKind::WasmContract) {
        specs.push(AdapterSpec::Contract(ContractStandard::Wasm));
    }

    specs
}
