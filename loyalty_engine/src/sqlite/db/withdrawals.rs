use lpg_common::Points;
use sqlx::SqliteConnection;

use crate::db_types::{NewWithdrawal, Withdrawal, WithdrawalStatus};

/// Records a withdrawal request with the given initial status. The order number is unique across all withdrawals,
/// so a repeated request fails with a unique constraint violation.
pub(crate) async fn insert_withdrawal(
    withdrawal: &NewWithdrawal,
    status: WithdrawalStatus,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, sqlx::Error> {
    sqlx::query_as("INSERT INTO withdrawals (order_id, user_id, amount, status) VALUES ($1, $2, $3, $4) RETURNING *")
        .bind(withdrawal.order_id.as_str())
        .bind(withdrawal.user_id)
        .bind(withdrawal.amount)
        .bind(status)
        .fetch_one(conn)
        .await
}

pub(crate) async fn update_withdrawal_status(
    id: i64,
    status: WithdrawalStatus,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, sqlx::Error> {
    sqlx::query_as("UPDATE withdrawals SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
        .bind(status)
        .bind(id)
        .fetch_one(conn)
        .await
}

pub(crate) async fn fetch_withdrawals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

pub(crate) async fn total_withdrawn(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, sqlx::Error> {
    let (total,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(amount), 0) FROM withdrawals WHERE user_id = $1 AND status = 'PROCESSED'")
            .bind(user_id)
            .fetch_one(conn)
            .await?;
    Ok(Points::from_hundredths(total))
}
