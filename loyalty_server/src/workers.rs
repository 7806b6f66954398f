//! Background workers.
//!
//! Each worker is a tokio task paired with a shutdown trigger. Stopping a worker asks it to finish the unit of work it
//! is busy with, and joining it waits until it has.
use std::{future::Future, time::Duration};

use accrual_tools::AccrualApi;
use log::*;
use loyalty_engine::{
    shutdown::{shutdown_signal, Shutdown, ShutdownTrigger},
    AccrualReconciler,
    BalanceMaterializer,
    SqliteDatabase,
};
use tokio::task::JoinHandle;

pub struct WorkerHandle {
    name: &'static str,
    trigger: ShutdownTrigger,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Asks the worker to stop. Use [`Self::join`] to wait for it.
    pub fn stop(&self) {
        self.trigger.trigger();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker to exit.
    pub async fn join(self) {
        match self.handle.await {
            Ok(()) => info!("🧵️ {} worker has stopped", self.name),
            Err(e) => error!("🧵️ {} worker did not exit cleanly. {e}", self.name),
        }
    }

    pub async fn stop_and_join(self) {
        self.stop();
        self.join().await;
    }
}

/// Spawns `worker` as a tokio task, handing it the shutdown signal that the returned handle controls.
pub fn spawn_worker<F, Fut>(name: &'static str, worker: F) -> WorkerHandle
where
    F: FnOnce(Shutdown) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (trigger, shutdown) = shutdown_signal();
    let handle = tokio::spawn(worker(shutdown));
    debug!("🧵️ {name} worker spawned");
    WorkerHandle { name, trigger, handle }
}

pub fn start_reconciler(db: SqliteDatabase, gateway: AccrualApi, interval: Duration) -> WorkerHandle {
    let reconciler = AccrualReconciler::new(db, gateway);
    spawn_worker("Accrual reconciler", move |shutdown| reconciler.run(shutdown, interval))
}

pub fn start_balance_materializer(db: SqliteDatabase, interval: Duration) -> WorkerHandle {
    let materializer = BalanceMaterializer::new(db);
    spawn_worker("Balance materializer", move |shutdown| materializer.run(shutdown, interval))
}

/// Stops every worker, then waits for all of them.
pub async fn stop_all(workers: Vec<WorkerHandle>) {
    workers.iter().for_each(WorkerHandle::stop);
    for worker in workers {
        worker.join().await;
    }
}
