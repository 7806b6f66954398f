use chrono::{DateTime, Utc};
use loyalty_engine::db_types::{Order, OrderStatusType, Withdrawal, WithdrawalStatus};
use lpg_common::Points;
use serde::{Deserialize, Serialize};

/// The body of a `POST /api/user/balance/withdraw` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// The order number the points are spent on.
    pub order: String,
    pub sum: Points,
}

/// An order, as presented to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub number: String,
    pub status: OrderStatusType,
    /// Only present once the order is `PROCESSED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let accrual = (order.status == OrderStatusType::Processed).then_some(order.accrual);
        Self { number: order.order_id.0, status: order.status, accrual, uploaded_at: order.created_at }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalView {
    pub order: String,
    pub sum: Points,
    pub status: WithdrawalStatus,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        Self { order: w.order_id.0, sum: w.amount, status: w.status, processed_at: w.updated_at }
    }
}
