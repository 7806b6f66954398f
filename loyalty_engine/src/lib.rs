//! Loyalty Engine
//!
//! The Loyalty Engine keeps the points ledger for the Loyalty Points Gateway. Users upload order numbers, an external
//! accrual service decides what each order is worth, and the reward is credited to the user's balance, which they can
//! later spend through withdrawals.
//!
//! The library is divided into three main sections:
//! 1. Ledger storage ([`mod@traits`] and the SQLite backend, [`SqliteDatabase`]). The traits define the atomic
//!    primitives that every consistency guarantee rests on. You should never need to access the database directly.
//!    The exception is the data types used in the database. These are defined in the [`mod@db_types`] module and
//!    are public.
//! 2. The request-driven API: [`OrderFlowApi`] for order uploads, [`WithdrawalApi`] for spending points and
//!    [`AccountApi`] for queries.
//! 3. The background workers: the [`AccrualReconciler`], which polls the accrual service and advances orders, and the
//!    [`BalanceMaterializer`], which turns recorded accruals into balance credits. They never talk to each other
//!    directly; all coordination happens through the ledger's transactions. Both are stopped with the
//!    [`shutdown`] signal.
pub mod db_types;
mod ledger_api;
pub mod shutdown;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ledger_api::{
    accounts_api::AccountApi,
    balance_materializer::BalanceMaterializer,
    errors::{OrderUploadError, WithdrawalError},
    order_flow_api::OrderFlowApi,
    reconciler::{AccrualReconciler, ReconcileOutcome, SweepSummary, DEFAULT_CONCURRENCY},
    withdrawal_api::WithdrawalApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
