//! Unifies API for accessing user accounts and their ledger history.

use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{AccrualEntry, Order, OrderId, UserAccount, Withdrawal},
    traits::{AccountApiError, AccountManagement, BalanceSummary, UserManagement, UserManagementError},
};

/// The `AccountApi` provides a unified API for accessing accounts.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    /// Fetches the user account for the given account id. If no account exists, `None` is returned.
    pub async fn account_by_id(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account(user_id).await
    }

    /// Resolves a session token to the user that holds it.
    pub async fn account_by_remember_token(&self, token: &str) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_by_remember_token(token).await
    }

    pub async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        self.db.fetch_withdrawals_for_user(user_id).await
    }

    pub async fn accrual_for_order(&self, order_id: &OrderId) -> Result<Option<AccrualEntry>, AccountApiError> {
        self.db.fetch_accrual_for_order(order_id).await
    }

    pub async fn pending_accruals(&self) -> Result<Vec<AccrualEntry>, AccountApiError> {
        self.db.fetch_pending_accruals().await
    }

    /// Returns the user's current balance and the total they have withdrawn to date, or `None` if the user does not
    /// exist.
    ///
    /// Accruals that have been recorded but not yet materialized are not part of the current balance.
    pub async fn balance(&self, user_id: i64) -> Result<Option<BalanceSummary>, AccountApiError> {
        let Some(account) = self.db.fetch_user_account(user_id).await? else {
            return Ok(None);
        };
        let withdrawn = self.db.fetch_total_withdrawn(user_id).await?;
        trace!("User #{user_id} balance: {}. Withdrawn: {withdrawn}", account.balance);
        Ok(Some(BalanceSummary::new(account.balance, withdrawn)))
    }
}

impl<B> AccountApi<B>
where B: UserManagement
{
    pub async fn create_user(&self, login: &str) -> Result<UserAccount, UserManagementError> {
        self.db.create_user(login).await
    }

    pub async fn set_remember_token(&self, user_id: i64, token: Option<&str>) -> Result<(), UserManagementError> {
        self.db.set_remember_token(user_id, token).await
    }
}
