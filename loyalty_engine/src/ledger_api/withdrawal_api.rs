use std::fmt::Debug;

use log::*;
use lpg_common::Points;

use crate::{
    db_types::{NewWithdrawal, OrderId, Withdrawal},
    ledger_api::errors::WithdrawalError,
    traits::LedgerDatabase,
};

/// `WithdrawalApi` spends a user's points against an order number.
pub struct WithdrawalApi<B> {
    db: B,
}

impl<B> Debug for WithdrawalApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WithdrawalApi")
    }
}

impl<B> WithdrawalApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> WithdrawalApi<B>
where B: LedgerDatabase
{
    /// Debits `amount` from the user's balance. The order number is the idempotency key: a second request with the
    /// same number fails with [`WithdrawalError::AlreadyProcessed`] and never debits twice.
    ///
    /// Order numbers that fail the Luhn check are rejected before anything is written.
    pub async fn withdraw(
        &self,
        user_id: i64,
        order_id: OrderId,
        amount: Points,
    ) -> Result<Withdrawal, WithdrawalError> {
        if !order_id.is_valid() {
            debug!("💰️ User #{user_id} tried to withdraw against invalid order number '{}'", order_id.as_str());
            return Err(WithdrawalError::InvalidOrderNumber(order_id.0));
        }
        let withdrawal = NewWithdrawal::new(order_id, user_id, amount);
        match self.db.process_withdrawal(withdrawal).await {
            Ok(w) => {
                info!("💰️ User #{user_id} withdrew {} for order {}", w.amount, w.order_id);
                Ok(w)
            },
            Err(e) => {
                let e = WithdrawalError::from(e);
                match &e {
                    WithdrawalError::Backend(msg) => error!("💰️ Withdrawal for user #{user_id} failed. {msg}"),
                    _ => debug!("💰️ Withdrawal for user #{user_id} rejected. {e}"),
                }
                Err(e)
            },
        }
    }
}
