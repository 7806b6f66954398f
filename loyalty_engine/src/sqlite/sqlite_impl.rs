//! `SqliteDatabase` is a concrete implementation of a loyalty engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::{collections::HashMap, fmt::Debug};

use log::*;
use lpg_common::Points;
use sqlx::SqlitePool;

use super::db::{accruals, db_url, is_guard_violation, new_pool, orders, users, withdrawals};
use crate::{
    db_types::{
        AccrualEntry,
        NewOrder,
        NewWithdrawal,
        Order,
        OrderId,
        OrderStatusType,
        UserAccount,
        Withdrawal,
        WithdrawalStatus,
    },
    traits::{
        AccountApiError,
        AccountManagement,
        InsertOrderResult,
        LedgerDatabase,
        LedgerError,
        UserManagement,
        UserManagementError,
    },
};

const FINAL_ORDER_GUARD: &str = "order status is final";

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatusType) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        if status == OrderStatusType::Processed {
            let order = orders::fetch_order_by_order_id(order_id, &mut conn)
                .await?
                .ok_or(LedgerError::OrderNotFound(order_id.clone()))?;
            let order_id = order_id.clone();
            return Err(LedgerError::InvalidStatusTransition { order_id, from: order.status, to: status });
        }
        match orders::update_transient_order_status(order_id, status, &mut conn).await? {
            Some(order) => {
                trace!("🗃️ Order {order_id} is now {status}");
                Ok(order)
            },
            None => {
                let order = orders::fetch_order_by_order_id(order_id, &mut conn)
                    .await?
                    .ok_or(LedgerError::OrderNotFound(order_id.clone()))?;
                if order.status == status {
                    return Ok(order);
                }
                warn!("🗃️ Order {order_id} is {} and cannot be moved to {status}", order.status);
                let order_id = order_id.clone();
                Err(LedgerError::InvalidStatusTransition { order_id, from: order.status, to: status })
            },
        }
    }

    async fn fetch_orders_by_status(&self, statuses: &[OrderStatusType]) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_by_status(statuses, &mut conn).await?;
        Ok(orders)
    }

    async fn record_accrual(&self, order_id: &OrderId, amount: Points) -> Result<AccrualEntry, LedgerError> {
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount(amount));
        }
        if amount > Points::MAX {
            return Err(LedgerError::AmountOutOfRange(amount));
        }
        let mut tx = self.pool.begin().await?;
        let entry = match accruals::insert_accrual(order_id, amount, &mut tx).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(LedgerError::OrderNotFound(order_id.clone())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(LedgerError::AccrualAlreadyExists(order_id.clone()));
            },
            Err(e) => return Err(e.into()),
        };
        match orders::mark_order_processed(order_id, amount, &mut tx).await {
            Ok(Some(_)) => {},
            Ok(None) => return Err(LedgerError::OrderNotFound(order_id.clone())),
            Err(e) if is_guard_violation(&e, FINAL_ORDER_GUARD) => {
                // Dropping the transaction rolls back the accrual entry
                return Err(LedgerError::InvalidStatusTransition {
                    order_id: order_id.clone(),
                    from: OrderStatusType::Invalid,
                    to: OrderStatusType::Processed,
                });
            },
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        debug!("🗃️ Accrual of {amount} recorded for order {order_id} (user #{})", entry.user_id);
        Ok(entry)
    }

    async fn apply_pending_accruals(&self) -> Result<Vec<AccrualEntry>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let entries = accruals::claim_unapplied_accruals(Points::MAX, &mut tx).await?;
        let held = accruals::count_unapplied_accruals(&mut tx).await?;
        if held > 0 {
            warn!("🗃️ {held} accrual entries are held back. Crediting them would exceed the balance limit");
        }
        if entries.is_empty() {
            tx.rollback().await?;
            return Ok(entries);
        }
        let mut credits = HashMap::<i64, Points>::new();
        for entry in &entries {
            let credit = credits.entry(entry.user_id).or_default();
            *credit = credit.checked_add(entry.amount).ok_or(LedgerError::BalanceLimitExceeded(entry.user_id))?;
        }
        for (user_id, amount) in credits {
            let balance =
                users::adjust_balance(user_id, amount, &mut tx).await?.ok_or(LedgerError::UserNotFound(user_id))?;
            trace!("🗃️ Credited {amount} to user #{user_id}. New balance: {balance}");
        }
        tx.commit().await?;
        debug!("🗃️ {} accrual entries applied", entries.len());
        Ok(entries)
    }

    async fn process_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError> {
        let requested = withdrawal.amount;
        let order_id = withdrawal.order_id.clone();
        let already_processed = |e: sqlx::Error| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => {
                LedgerError::WithdrawalAlreadyProcessed(order_id.clone())
            },
            sqlx::Error::Database(err) if err.is_foreign_key_violation() => {
                LedgerError::UserNotFound(withdrawal.user_id)
            },
            e => LedgerError::from(e),
        };
        let mut tx = self.pool.begin().await?;
        if requested.is_negative() {
            withdrawals::insert_withdrawal(&withdrawal, WithdrawalStatus::Invalid, &mut tx)
                .await
                .map_err(already_processed)?;
            tx.commit().await?;
            info!("🗃️ Withdrawal {order_id} rejected. Negative amount: {requested}");
            return Err(LedgerError::NegativeAmount(requested));
        }
        // The insert takes the write lock, so no other withdrawal or credit can touch the balance until we are done
        let entry = withdrawals::insert_withdrawal(&withdrawal, WithdrawalStatus::Processing, &mut tx)
            .await
            .map_err(already_processed)?;
        let available = users::fetch_balance(withdrawal.user_id, &mut tx)
            .await?
            .ok_or(LedgerError::UserNotFound(withdrawal.user_id))?;
        if available < requested {
            withdrawals::update_withdrawal_status(entry.id, WithdrawalStatus::Invalid, &mut tx).await?;
            tx.commit().await?;
            let user_id = withdrawal.user_id;
            info!("🗃️ Withdrawal {order_id} of {requested} rejected. User #{user_id} has {available}");
            return Err(LedgerError::InsufficientFunds { available, requested });
        }
        let balance = users::adjust_balance(withdrawal.user_id, -requested, &mut tx)
            .await?
            .ok_or(LedgerError::UserNotFound(withdrawal.user_id))?;
        let entry = withdrawals::update_withdrawal_status(entry.id, WithdrawalStatus::Processed, &mut tx).await?;
        tx.commit().await?;
        let user_id = entry.user_id;
        debug!("🗃️ Withdrawal {order_id} of {requested} processed. User #{user_id} balance is now {balance}");
        Ok(entry)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::user_by_id(user_id, &mut conn).await?)
    }

    async fn fetch_user_by_remember_token(&self, token: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::user_by_remember_token(token, &mut conn).await?)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_accrual_for_order(&self, order_id: &OrderId) -> Result<Option<AccrualEntry>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(accruals::fetch_accrual_for_order(order_id, &mut conn).await?)
    }

    async fn fetch_pending_accruals(&self) -> Result<Vec<AccrualEntry>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(accruals::fetch_unapplied_accruals(&mut conn).await?)
    }

    async fn fetch_total_withdrawn(&self, user_id: i64) -> Result<Points, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::total_withdrawn(user_id, &mut conn).await?)
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, login: &str) -> Result<UserAccount, UserManagementError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(login, &mut conn).await?;
        debug!("🗃️ Created user #{} ({login})", user.id);
        Ok(user)
    }

    async fn set_remember_token(&self, user_id: i64, token: Option<&str>) -> Result<(), UserManagementError> {
        let mut conn = self.pool.acquire().await?;
        match users::update_remember_token(user_id, token, &mut conn).await? {
            0 => Err(UserManagementError::UserNotFound(user_id)),
            _ => Ok(()),
        }
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
