use lpg_common::Points;
use thiserror::Error;

use crate::db_types::{AccrualEntry, Order, OrderId, UserAccount, Withdrawal};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait defines the read-only queries against the ledger.
///
/// None of these methods modify state, so callers are free to call them at any time, from any task.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user account associated with the given id. If no account exists, `None` is returned.
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError>;

    /// Fetches the user that currently holds the given session token.
    async fn fetch_user_by_remember_token(&self, token: &str) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;

    /// All orders uploaded by the user, oldest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// All withdrawals requested by the user, including rejected ones, oldest first.
    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError>;

    async fn fetch_accrual_for_order(&self, order_id: &OrderId) -> Result<Option<AccrualEntry>, AccountApiError>;

    /// Accrual entries that have been recorded but not yet credited to a balance.
    async fn fetch_pending_accruals(&self) -> Result<Vec<AccrualEntry>, AccountApiError>;

    /// The sum of all `PROCESSED` withdrawals for the user.
    async fn fetch_total_withdrawn(&self, user_id: i64) -> Result<Points, AccountApiError>;
}
