use lpg_common::Points;
use thiserror::Error;

use crate::{
    db_types::{Order, OrderId},
    traits::LedgerError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderUploadError {
    #[error("Order number {0} is not valid")]
    InvalidOrderNumber(String),
    #[error("Order {} has already been uploaded by this user", .0.order_id)]
    AlreadyUploadedByUser(Box<Order>),
    #[error("Order {0} has already been uploaded by another user")]
    OwnedByAnotherUser(OrderId),
    #[error("Could not upload order. {0}")]
    Backend(LedgerError),
}

impl From<LedgerError> for OrderUploadError {
    fn from(e: LedgerError) -> Self {
        Self::Backend(e)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WithdrawalError {
    #[error("Order number {0} is not valid")]
    InvalidOrderNumber(String),
    #[error("Withdrawal amount cannot be negative: {0}")]
    NegativeAmount(Points),
    #[error("Withdrawal {0} has already been processed")]
    AlreadyProcessed(OrderId),
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { available: Points, requested: Points },
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
    #[error("Could not process withdrawal. {0}")]
    Backend(String),
}

impl From<LedgerError> for WithdrawalError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::WithdrawalAlreadyProcessed(id) => Self::AlreadyProcessed(id),
            LedgerError::InsufficientFunds { available, requested } => Self::InsufficientFunds { available, requested },
            LedgerError::NegativeAmount(amount) => Self::NegativeAmount(amount),
            LedgerError::UserNotFound(id) => Self::UserNotFound(id),
            e => Self::Backend(e.to_string()),
        }
    }
}
