//! # Ledger storage contracts.
//!
//! This module provides the interfaces that define the interface contracts of the loyalty engine database
//! *backends*.
//!
//! * [`LedgerDatabase`] holds the write-side primitives of the ledger: creating orders, advancing their status,
//!   recording accrual entries, materializing them into balances, and processing withdrawals. Every method is atomic.
//! * [`AccountManagement`] provides the read side: users, orders, withdrawals and balances.
//! * [`UserManagement`] provisions users and their session tokens.
mod account_management;
mod data_objects;
mod ledger_database;
mod user_management;

pub use account_management::{AccountApiError, AccountManagement};
pub use data_objects::{BalanceSummary, InsertOrderResult};
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use user_management::{UserManagement, UserManagementError};
