use lpg_common::Points;
use serde::{Deserialize, Serialize};

use crate::db_types::Order;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// The order number is already in use. The existing record is returned so that callers can tell who owns it.
    AlreadyExists(Order),
}

/// A user's spendable balance, and the sum of all their successful withdrawals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub current: Points,
    pub withdrawn: Points,
}

impl BalanceSummary {
    pub fn new(current: Points, withdrawn: Points) -> Self {
        Self { current, withdrawn }
    }
}
