//! The accrual reconciler drives uploaded orders through their lifecycle.
//!
//! Each sweep fetches every order in a transient state (`NEW`, `REGISTERED` or `PROCESSING`) and asks the accrual
//! service about it. Orders are handled independently of one another, so a failure on one order never affects the
//! rest of the sweep. Anything that goes wrong is logged and the order is simply looked at again on the next sweep.
use std::{fmt::Display, time::Duration};

use accrual_tools::{AccrualApiError, AccrualGateway, AccrualStatus};
use futures_util::{stream::FuturesUnordered, StreamExt};
use log::*;
use lpg_common::Points;

use crate::{
    db_types::{Order, OrderStatusType},
    shutdown::Shutdown,
    traits::{LedgerDatabase, LedgerError},
};

pub const DEFAULT_CONCURRENCY: usize = 8;

/// What happened to a single order during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order is already in a terminal state.
    Skipped,
    /// The accrual service had nothing new to say.
    Unchanged,
    /// The order moved to a new transient status.
    StatusUpdated(OrderStatusType),
    /// The order will never earn points.
    Invalidated,
    /// An accrual entry was recorded and the order is now `PROCESSED`.
    Accrued(Points),
    /// Another sweep got there first.
    AlreadyAccrued,
    /// The accrual service was unreachable, or gave an answer that could not be used.
    GatewayError,
    /// A storage operation failed.
    StorageError,
    /// Shutdown was requested before the order was looked at.
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub examined: usize,
    pub unchanged: usize,
    pub updated: usize,
    pub invalidated: usize,
    pub accrued: usize,
    pub gateway_errors: usize,
    pub storage_errors: usize,
    pub cancelled: usize,
}

impl SweepSummary {
    pub fn record(&mut self, outcome: ReconcileOutcome) {
        self.examined += 1;
        match outcome {
            ReconcileOutcome::Skipped | ReconcileOutcome::Unchanged | ReconcileOutcome::AlreadyAccrued => {
                self.unchanged += 1
            },
            ReconcileOutcome::StatusUpdated(_) => self.updated += 1,
            ReconcileOutcome::Invalidated => self.invalidated += 1,
            ReconcileOutcome::Accrued(_) => self.accrued += 1,
            ReconcileOutcome::GatewayError => self.gateway_errors += 1,
            ReconcileOutcome::StorageError => self.storage_errors += 1,
            ReconcileOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

impl Display for SweepSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} orders examined: {} accrued, {} invalidated, {} updated, {} unchanged, {} gateway errors, {} storage \
             errors, {} cancelled",
            self.examined,
            self.accrued,
            self.invalidated,
            self.updated,
            self.unchanged,
            self.gateway_errors,
            self.storage_errors,
            self.cancelled
        )
    }
}

pub struct AccrualReconciler<B, G> {
    db: B,
    gateway: G,
    concurrency: usize,
}

impl<B, G> AccrualReconciler<B, G>
where
    B: LedgerDatabase,
    G: AccrualGateway,
{
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway, concurrency: DEFAULT_CONCURRENCY }
    }

    /// Sets the number of orders that are reconciled at the same time. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs a single sweep over every transient order.
    ///
    /// Only a failure to fetch the orders in the first place is returned as an error. Problems with individual orders
    /// are logged and counted in the summary.
    pub async fn run_sweep(&self, shutdown: &Shutdown) -> Result<SweepSummary, LedgerError> {
        let orders = self.db.fetch_orders_by_status(&OrderStatusType::TRANSIENT).await?;
        trace!("🔄️ {} orders awaiting reconciliation", orders.len());
        let mut pending = orders.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut summary = SweepSummary::default();
        loop {
            while in_flight.len() < self.concurrency {
                match pending.next() {
                    Some(order) => in_flight.push(self.reconcile_order(order, shutdown.clone())),
                    None => break,
                }
            }
            match in_flight.next().await {
                Some(outcome) => summary.record(outcome),
                None => break,
            }
        }
        Ok(summary)
    }

    /// Sweeps every `interval` until `shutdown` is triggered. The signal is checked before each sweep and before each
    /// call to the accrual service. A write that is already under way always completes.
    pub async fn run(self, mut shutdown: Shutdown, interval: Duration) {
        info!("🔄️ Accrual reconciler started. Sweeping every {interval:?}");
        loop {
            if shutdown.is_triggered() {
                break;
            }
            match self.run_sweep(&shutdown).await {
                Ok(summary) if summary.examined > 0 => debug!("🔄️ Sweep complete. {summary}"),
                Ok(_) => {},
                Err(e) => error!("🔄️ Could not fetch orders for reconciliation. Will retry on the next sweep. {e}"),
            }
            if shutdown.sleep(interval).await {
                break;
            }
        }
        info!("🔄️ Accrual reconciler stopped");
    }

    /// Brings one order up to date with the accrual service.
    pub async fn reconcile_order(&self, order: Order, mut shutdown: Shutdown) -> ReconcileOutcome {
        if order.status.is_terminal() {
            return ReconcileOutcome::Skipped;
        }
        if shutdown.is_triggered() {
            return ReconcileOutcome::Cancelled;
        }
        let order_id = &order.order_id;
        let mut current = order.status;
        if current == OrderStatusType::New {
            match self.db.update_order_status(order_id, OrderStatusType::Registered).await {
                Ok(o) => current = o.status,
                Err(e) => {
                    error!("🔄️ Could not register order {order_id}. {e}");
                    return ReconcileOutcome::StorageError;
                },
            }
        }
        let response = tokio::select! {
            biased;
            _ = shutdown.triggered() => return ReconcileOutcome::Cancelled,
            r = self.gateway.fetch_accrual(order_id.as_str()) => r,
        };
        let response = match response {
            Ok(r) => r,
            Err(e @ AccrualApiError::UnexpectedStatus { .. }) => {
                warn!("🔄️ Accrual service declined to answer for order {order_id}. {e}");
                return ReconcileOutcome::GatewayError;
            },
            Err(e) => {
                error!("🔄️ Could not query accrual service for order {order_id}. {e}");
                return ReconcileOutcome::GatewayError;
            },
        };
        if response.order != order_id.as_str() {
            warn!("🔄️ Asked about order {order_id}, but the accrual service answered for #{}", response.order);
            return ReconcileOutcome::GatewayError;
        }
        match (response.status, response.accrual) {
            (AccrualStatus::Processed, None) => {
                warn!("🔄️ Order {order_id} is PROCESSED, but the accrual service did not send an amount");
                ReconcileOutcome::GatewayError
            },
            (AccrualStatus::Processed, Some(amount)) if amount.is_negative() => {
                warn!("🔄️ Accrual service awarded a negative amount ({amount}) for order {order_id}");
                self.set_status(&order, OrderStatusType::Invalid).await
            },
            (AccrualStatus::Processed, Some(amount)) => self.accrue(&order, amount).await,
            (AccrualStatus::Registered, _)
                if matches!(current, OrderStatusType::Registered | OrderStatusType::Processing) =>
            {
                ReconcileOutcome::Unchanged
            },
            (status, _) => {
                let target = OrderStatusType::from(status);
                if target == current {
                    ReconcileOutcome::Unchanged
                } else {
                    self.set_status(&order, target).await
                }
            },
        }
    }

    async fn accrue(&self, order: &Order, amount: Points) -> ReconcileOutcome {
        let order_id = &order.order_id;
        match self.db.record_accrual(order_id, amount).await {
            Ok(entry) => {
                info!("🔄️ Order {order_id} earned {amount} for user #{}", entry.user_id);
                ReconcileOutcome::Accrued(amount)
            },
            Err(LedgerError::AccrualAlreadyExists(_)) => {
                info!("🔄️ Accrual for order {order_id} has already been recorded");
                ReconcileOutcome::AlreadyAccrued
            },
            Err(e @ LedgerError::InvalidStatusTransition { .. }) => {
                warn!("🔄️ Accrual for order {order_id} not recorded. {e}");
                ReconcileOutcome::Unchanged
            },
            Err(e) => {
                error!("🔄️ Could not record accrual of {amount} for order {order_id}. {e}");
                ReconcileOutcome::StorageError
            },
        }
    }

    async fn set_status(&self, order: &Order, status: OrderStatusType) -> ReconcileOutcome {
        let order_id = &order.order_id;
        match self.db.update_order_status(order_id, status).await {
            Ok(_) if status == OrderStatusType::Invalid => {
                info!("🔄️ Order {order_id} is INVALID and will not earn points");
                ReconcileOutcome::Invalidated
            },
            Ok(_) => {
                debug!("🔄️ Order {order_id} is now {status}");
                ReconcileOutcome::StatusUpdated(status)
            },
            Err(e @ LedgerError::InvalidStatusTransition { .. }) => {
                warn!("🔄️ {e}");
                ReconcileOutcome::Unchanged
            },
            Err(e) => {
                error!("🔄️ Could not move order {order_id} to {status}. {e}");
                ReconcileOutcome::StorageError
            },
        }
    }
}
