use lpg_common::Points;
use thiserror::Error;

use crate::{
    db_types::{AccrualEntry, NewOrder, NewWithdrawal, Order, OrderId, OrderStatusType, Withdrawal},
    traits::{data_objects::InsertOrderResult, AccountManagement},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("An accrual entry for order {0} already exists")]
    AccrualAlreadyExists(OrderId),
    #[error("Withdrawal {0} has already been processed")]
    WithdrawalAlreadyProcessed(OrderId),
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { available: Points, requested: Points },
    #[error("Amounts cannot be negative: {0}")]
    NegativeAmount(Points),
    #[error("{0} is larger than the biggest amount the ledger can hold")]
    AmountOutOfRange(Points),
    #[error("Crediting user #{0} would take their balance over the limit")]
    BalanceLimitExceeded(i64),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// This trait defines the write side of the ledger. Every method is a single atomic unit of work: either all of its
/// effects are persisted, or none are.
///
/// The reconciler, the balance materializer and the withdrawal processor communicate only through these methods.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase: Clone + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a brand-new order with status `NEW` and a zero accrual.
    ///
    /// If the order number is already in use (by anyone), nothing is written and the existing order is returned as
    /// [`InsertOrderResult::AlreadyExists`].
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, LedgerError>;

    /// Moves an order to a new non-`PROCESSED` status. An order only becomes `PROCESSED` via
    /// [`Self::record_accrual`].
    ///
    /// Orders in a terminal state cannot be moved, and an attempt to do so returns
    /// [`LedgerError::InvalidStatusTransition`]. Setting the status an order already has is a no-op.
    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatusType) -> Result<Order, LedgerError>;

    /// Fetches every order whose status is one of `statuses`, oldest first.
    async fn fetch_orders_by_status(&self, statuses: &[OrderStatusType]) -> Result<Vec<Order>, LedgerError>;

    /// In a single atomic transaction,
    /// * creates an (unapplied) accrual entry for the order and its owner,
    /// * marks the order as `PROCESSED`, with the accrued amount.
    ///
    /// If an entry already exists for the order, nothing is written and [`LedgerError::AccrualAlreadyExists`] is
    /// returned. Negative amounts, and amounts above [`Points::MAX`], are rejected.
    async fn record_accrual(&self, order_id: &OrderId, amount: Points) -> Result<AccrualEntry, LedgerError>;

    /// In a single atomic transaction, credits every unapplied accrual entry to its owner's balance and marks the
    /// entry as applied. Returns the entries that were applied, which is empty if there was nothing to do.
    ///
    /// Entries that would take their owner's balance over [`Points::MAX`] are left unapplied, and do not hold up
    /// anyone else's credits. If anything fails, no entry is applied and no balance changes.
    async fn apply_pending_accruals(&self) -> Result<Vec<AccrualEntry>, LedgerError>;

    /// Debits the user's balance, using the withdrawal's order number as an idempotency key.
    ///
    /// * A negative amount is recorded as an `INVALID` withdrawal and rejected with [`LedgerError::NegativeAmount`].
    /// * A repeated order number is rejected with [`LedgerError::WithdrawalAlreadyProcessed`] and changes nothing.
    /// * If the balance is too low, the withdrawal is recorded as `INVALID`, the balance is left unchanged, and
    ///   [`LedgerError::InsufficientFunds`] is returned.
    /// * Otherwise the balance is debited and the withdrawal is recorded as `PROCESSED`.
    ///
    /// Concurrent withdrawals for the same user are serialised, so a balance can never go negative.
    async fn process_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}
