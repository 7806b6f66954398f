use lpg_common::Points;
use sqlx::SqliteConnection;

use crate::{db_types::UserAccount, traits::UserManagementError};

pub(crate) async fn insert_user(login: &str, conn: &mut SqliteConnection) -> Result<UserAccount, UserManagementError> {
    let user = sqlx::query_as("INSERT INTO users (login) VALUES ($1) RETURNING *")
        .bind(login)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => {
                UserManagementError::LoginAlreadyExists(login.to_string())
            },
            e => UserManagementError::from(e),
        })?;
    Ok(user)
}

pub(crate) async fn user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await
}

pub(crate) async fn user_by_remember_token(
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE remember_token = $1").bind(token).fetch_optional(conn).await
}

/// Returns the number of rows updated, which is zero if the user does not exist.
pub(crate) async fn update_remember_token(
    user_id: i64,
    token: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET remember_token = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(token)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Reads the current balance for the user. Inside a write transaction, the value cannot change until the transaction
/// ends.
pub(crate) async fn fetch_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Points>, sqlx::Error> {
    let balance: Option<(Points,)> =
        sqlx::query_as("SELECT balance FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(balance.map(|(b,)| b))
}

/// Adds `delta` (which may be negative) to the user's balance and returns the new balance, or `None` if the user does
/// not exist. The schema refuses any update that would leave the balance negative.
pub(crate) async fn adjust_balance(
    user_id: i64,
    delta: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<Points>, sqlx::Error> {
    let balance: Option<(Points,)> = sqlx::query_as(
        "UPDATE users SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING balance",
    )
    .bind(delta)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(balance.map(|(b,)| b))
}
