use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    ledger_api::errors::OrderUploadError,
    traits::{InsertOrderResult, LedgerDatabase},
};

/// `OrderFlowApi` accepts order uploads from users.
///
/// A freshly uploaded order starts out as `NEW`. The [`crate::AccrualReconciler`] picks it up from there.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: LedgerDatabase
{
    /// Uploads an order number on behalf of `user_id`.
    ///
    /// The outcomes callers need to tell apart are:
    /// * `Ok(order)`: the order is new and was stored with status `NEW`.
    /// * [`OrderUploadError::AlreadyUploadedByUser`]: this user already uploaded the same number. Nothing changed.
    /// * [`OrderUploadError::OwnedByAnotherUser`]: someone else owns this number. Nothing changed.
    /// * [`OrderUploadError::InvalidOrderNumber`]: the number fails the Luhn check.
    pub async fn upload_order(&self, user_id: i64, order_id: OrderId) -> Result<Order, OrderUploadError> {
        if !order_id.is_valid() {
            debug!("🔄️📦️ User #{user_id} tried to upload invalid order number '{}'", order_id.as_str());
            return Err(OrderUploadError::InvalidOrderNumber(order_id.0));
        }
        match self.db.insert_order(NewOrder::new(order_id, user_id)).await? {
            InsertOrderResult::Inserted(order) => {
                info!("🔄️📦️ Order {} uploaded by user #{user_id}", order.order_id);
                Ok(order)
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user_id => {
                debug!("🔄️📦️ Order {} was already uploaded by user #{user_id}", order.order_id);
                Err(OrderUploadError::AlreadyUploadedByUser(Box::new(order)))
            },
            InsertOrderResult::AlreadyExists(order) => {
                warn!(
                    "🔄️📦️ User #{user_id} tried to upload order {}, which belongs to user #{}",
                    order.order_id, order.user_id
                );
                Err(OrderUploadError::OwnedByAnotherUser(order.order_id))
            },
        }
    }
}
