use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::{InsertOrderResult, LedgerError},
};

/// Inserts the order into the database. If the order number is already taken, the existing order is returned instead
/// and nothing is written.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<InsertOrderResult, LedgerError> {
    let order_id = order.order_id.clone();
    let user_id = order.user_id;
    match insert_order(order, conn).await {
        Ok(order) => {
            debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
            Ok(InsertOrderResult::Inserted(order))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let existing =
                fetch_order_by_order_id(&order_id, conn).await?.ok_or(LedgerError::OrderNotFound(order_id))?;
            trace!("📝️ Order [{}] already exists for user #{}", existing.order_id, existing.user_id);
            Ok(InsertOrderResult::AlreadyExists(existing))
        },
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(LedgerError::UserNotFound(user_id)),
        Err(e) => Err(e.into()),
    }
}

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    sqlx::query_as("INSERT INTO orders (order_id, user_id) VALUES ($1, $2) RETURNING *")
        .bind(order.order_id)
        .bind(order.user_id)
        .fetch_one(conn)
        .await
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await
}

/// Fetches all orders with any of the given statuses, ordered by `created_at` in ascending order.
pub async fn fetch_orders_by_status(
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE status IN (");
    let mut list = builder.separated(", ");
    for status in statuses {
        list.push_bind(*status);
    }
    builder.push(") ORDER BY created_at ASC, id ASC");
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ Result of fetch_orders_by_status: {}", orders.len());
    Ok(orders)
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

/// Sets the status of a non-terminal order. Returns `None` if the order does not exist or is already in a terminal
/// state.
pub(crate) async fn update_transient_order_status(
    order_id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $2 AND status NOT IN ('INVALID', 'PROCESSED')
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Marks the order as `PROCESSED` with the given accrual. The schema rejects this if the order is already final.
pub(crate) async fn mark_order_processed(
    order_id: &OrderId,
    accrual: lpg_common::Points,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET status = 'PROCESSED', accrual = $1, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $2
        RETURNING *
        "#,
    )
    .bind(accrual)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await
}
