use crate::types::BalanceRecord;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Receiver of normalized records, shared by every adapter of a session.
///
/// Each call carries a batch of fresh records which replace whatever the
/// sink holds for the same (address, token) keys.
pub trait BalanceSink: Send + Sync {
    fn emit(&self, records: Vec<BalanceRecord>);
}

pub type SharedSink = Arc<dyn BalanceSink>;

impl<F> BalanceSink for F
where
    F: Fn(Vec<BalanceRecord>) + Send + Sync,
{
    fn emit(&self, records: Vec<BalanceRecord>) {
        self(records)
    }
}

/// Forwards every batch into a channel, for callers consuming records from
/// their own task.
pub fn channel_sink(tx: UnboundedSender<Vec<BalanceRecord>>) -> SharedSink {
    Arc::new(move |records: Vec<BalanceRecord>| {
        if tx.send(records).is_err() {
            log::debug!("balance sink receiver dropped");
        }
    })
}
