use std::time::Duration;

use log::*;
use tokio::time::MissedTickBehavior;

use crate::{
    shutdown::Shutdown,
    traits::{LedgerDatabase, LedgerError},
};

/// Credits recorded accruals to their owners' balances.
///
/// This is the only component that marks accrual entries as applied. Each tick applies the whole pending batch in one
/// transaction, so a failed tick credits nothing and the batch is picked up again on the next one.
pub struct BalanceMaterializer<B> {
    db: B,
}

impl<B> BalanceMaterializer<B>
where B: LedgerDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Applies every pending accrual entry. Returns the number of entries applied.
    pub async fn tick(&self) -> Result<usize, LedgerError> {
        let applied = self.db.apply_pending_accruals().await?;
        if !applied.is_empty() {
            info!("💰️ {} accrual entries credited to user balances", applied.len());
        }
        Ok(applied.len())
    }

    /// Ticks every `interval` until `shutdown` is triggered. A tick that has started always runs to completion.
    pub async fn run(self, mut shutdown: Shutdown, interval: Duration) {
        let mut timer = tokio::time::interval(interval.max(Duration::from_millis(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("💰️ Balance materializer started. Ticking every {interval:?}");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                _ = timer.tick() => {},
            }
            if let Err(e) = self.tick().await {
                error!("💰️ Could not apply pending accruals. Will retry on the next tick. {e}");
            }
        }
        info!("💰️ Balance materializer stopped");
    }
}
