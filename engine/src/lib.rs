#![deny(clippy::dbg_macro)]

pub mod adapters;
pub mod config;
pub mod errors;
pub mod handle;
pub mod raw;
pub mod router;
pub mod service;
pub mod sink;
pub mod types;

#[cfg(test)]
mod mock;

pub use config::EngineConfig;
pub use errors::EngineError;
pub use handle::SubscriptionHandle;
pub use service::{BalanceService, ChainClients};
pub use sink::{channel_sink, BalanceSink, SharedSink};
