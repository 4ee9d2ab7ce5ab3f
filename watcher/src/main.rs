#![deny(clippy::all)]
#![deny(clippy::dbg_macro)]

use anyhow::Error;
use balance_engine::{
    types::{Address, BalanceRecord},
    BalanceService, EngineConfig,
};
use env_logger::{Builder, Env};
use log::{error, info};
use std::{path::PathBuf, sync::Arc};
use structopt::StructOpt;

mod clients;
mod registry;

use clients::EnvClients;
use registry::Registry;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Balance watcher params",
    about = "Polls ERC20 balances of a set of wallets on the EVM chains with a `<CHAIN>_RPC` \
             endpoint and logs every update. Substrate and WASM balances need a client \
             supplied through `balance_engine::ChainClients`."
)]
struct Opt {
    /// Set logging level
    #[structopt(short, long, default_value = "warn")]
    log: String,

    /// Path of the JSON chain and token registry
    #[structopt(short, long, parse(from_os_str), default_value = "registry.json")]
    registry: PathBuf,

    /// Wallet addresses to watch
    #[structopt(required = true)]
    addresses: Vec<Address>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let opt = Opt::from_args();

    Builder::from_env(Env::default().default_filter_or(&opt.log)).init();

    if let Err(e) = try_main(&opt).await {
        error!("{e:#}");
        std::process::exit(1);
    }

    info!("Exiting gracefully");
}

fn log_records(records: Vec<BalanceRecord>) {
    for record in records {
        match serde_json::to_string(&record) {
            Ok(json) => info!("{json}"),
            Err(e) => error!("{} {}: {e}", record.address, record.token_slug),
        }
    }
}

async fn try_main(opt: &Opt) -> Result<(), Error> {
    let registry = Registry::load(&opt.registry)?;
    let config = EngineConfig::from_env()?;

    info!(
        "Watching {} addresses on {} chains",
        opt.addresses.len(),
        registry.chains.iter().filter(|chain| chain.active).count()
    );

    let service = BalanceService::new(Arc::new(EnvClients), config);
    let handle = service.start_all(
        &opt.addresses,
        &registry.chains,
        &registry.tokens,
        Arc::new(log_records),
    );

    tokio::signal::ctrl_c().await?;
    handle.unsubscribe();

    Ok(())
}
