//! Cooperative shutdown for long-running background tasks.
//!
//! A [`ShutdownTrigger`] is held by whoever owns a task, and the task holds the matching [`Shutdown`]. Tasks check
//! the signal between units of work and never abandon one half-way through. Dropping the trigger counts as
//! triggering it.
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

#[derive(Debug, Clone)]
pub struct Shutdown(watch::Receiver<bool>);

pub fn shutdown_signal() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), Shutdown(rx))
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.0.send(true);
    }
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow() || self.0.has_changed().is_err()
    }

    /// Resolves once shutdown has been requested.
    pub async fn triggered(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                return;
            }
        }
    }

    /// Sleeps for `duration`, waking early if shutdown is requested. Returns `true` if shutdown was requested.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.is_triggered(),
            _ = self.triggered() => true,
        }
    }
}
