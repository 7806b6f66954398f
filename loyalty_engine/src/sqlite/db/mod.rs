//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! SQLite only has a database-wide write lock. Every transaction in [`super::SqliteDatabase`] that writes therefore
//! starts with a write statement, so that it takes the lock (waiting for it if necessary) before it reads anything.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod accruals;
pub mod orders;
pub mod users;
pub mod withdrawals;

const SQLITE_DB_URL: &str = "sqlite://data/loyalty.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("LPG_DATABASE_URL").unwrap_or_else(|_| {
        info!("LPG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// True if the error was raised by one of the `RAISE(ABORT, ...)` guard triggers in the schema with the given
/// message.
pub(crate) fn is_guard_violation(e: &SqlxError, message: &str) -> bool {
    matches!(e, SqlxError::Database(err) if err.message().contains(message))
}
