//! # Loyalty engine public API
//!
//! The `ledger_api` module exposes the programmatic API for the loyalty engine. Clients pick the parts they need.
//!
//! * [`order_flow_api`] accepts order uploads.
//! * [`withdrawal_api`] spends points.
//! * [`accounts_api`] answers queries about users, orders, balances and withdrawals, and provisions users.
//! * [`reconciler`] drives orders through their lifecycle by polling the accrual service.
//! * [`balance_materializer`] credits recorded accruals to user balances.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits required by the
//! API.
//!
//! ```rust,ignore
//! use loyalty_engine::{AccountApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements AccountManagement
//! let api = AccountApi::new(db);
//! let balance = api.balance(user_id).await?;
//! ```
//!
//! The reconciler and materializer are long-running loops. Call their `run` methods from a spawned task, passing a
//! [`crate::shutdown::Shutdown`] to stop them.

pub mod accounts_api;
pub mod balance_materializer;
pub mod errors;
pub mod order_flow_api;
pub mod reconciler;
pub mod withdrawal_api;
