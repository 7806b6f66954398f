use lpg_common::Points;
use sqlx::SqliteConnection;

use crate::db_types::{AccrualEntry, OrderId};

/// Creates an unapplied accrual entry for the order, attributed to the order's owner.
///
/// Returns `None` if the order does not exist. A second entry for the same order fails with a unique constraint
/// violation.
pub(crate) async fn insert_accrual(
    order_id: &OrderId,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<AccrualEntry>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO accruals (order_id, user_id, amount)
        SELECT order_id, user_id, $2 FROM orders WHERE order_id = $1
        RETURNING *
        "#,
    )
    .bind(order_id.as_str())
    .bind(amount)
    .fetch_optional(conn)
    .await
}

/// Flags unapplied entries as applied and returns them. This is the only statement that ever writes the `applied`
/// column.
///
/// A user's entries are only claimed if their balance plus everything pending for them stays within `limit`.
/// `TOTAL` sums as a float, so a huge backlog cannot overflow the check itself.
pub(crate) async fn claim_unapplied_accruals(
    limit: Points,
    conn: &mut SqliteConnection,
) -> Result<Vec<AccrualEntry>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE accruals SET applied = TRUE, applied_at = CURRENT_TIMESTAMP
        WHERE applied = FALSE AND user_id IN (
            SELECT a.user_id FROM accruals a JOIN users u ON u.id = a.user_id
            WHERE a.applied = FALSE
            GROUP BY a.user_id, u.balance
            HAVING u.balance + TOTAL(a.amount) <= $1
        )
        RETURNING *
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await
}

pub(crate) async fn count_unapplied_accruals(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accruals WHERE applied = FALSE").fetch_one(conn).await?;
    Ok(count)
}

pub(crate) async fn fetch_unapplied_accruals(conn: &mut SqliteConnection) -> Result<Vec<AccrualEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM accruals WHERE applied = FALSE ORDER BY id ASC").fetch_all(conn).await
}

pub(crate) async fn fetch_accrual_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<AccrualEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM accruals WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await
}
