use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lpg_common::{luhn, Points};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
/// An order number, as supplied by the user. Order numbers are globally unique, and carry a Luhn check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the order number consists only of digits and carries a valid check digit.
    pub fn is_valid(&self) -> bool {
        luhn::validate(&self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle of an uploaded order.
///
/// ```text
///   NEW ──► REGISTERED ──► PROCESSING ──► PROCESSED
///    │           │              │
///    └───────────┴──────────────┴───────► INVALID
/// ```
/// `INVALID` and `PROCESSED` are terminal. The rest are re-checked against the accrual service on every
/// sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been uploaded, but the accrual service has not been asked about it yet.
    New,
    /// The accrual service knows about the order, but has not started the calculation.
    Registered,
    /// The order will never earn points.
    Invalid,
    /// The accrual service is calculating the reward.
    Processing,
    /// The reward has been calculated and an accrual entry has been recorded.
    Processed,
}

impl OrderStatusType {
    pub const TRANSIENT: [OrderStatusType; 3] = [Self::New, Self::Registered, Self::Processing];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    pub fn is_transient(&self) -> bool {
        !self.is_terminal()
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Registered => write!(f, "REGISTERED"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "REGISTERED" => Ok(Self::Registered),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSING" => Ok(Self::Processing),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<accrual_tools::AccrualStatus> for OrderStatusType {
    fn from(value: accrual_tools::AccrualStatus) -> Self {
        use accrual_tools::AccrualStatus;
        match value {
            AccrualStatus::Registered => Self::Registered,
            AccrualStatus::Invalid => Self::Invalid,
            AccrualStatus::Processing => Self::Processing,
            AccrualStatus::Processed => Self::Processed,
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: i64,
    pub status: OrderStatusType,
    /// The reward credited for this order. Zero until the order is `PROCESSED`.
    pub accrual: Points,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: i64,
}

impl NewOrder {
    pub fn new<O: Into<OrderId>>(order_id: O, user_id: i64) -> Self {
        Self { order_id: order_id.into(), user_id }
    }
}

//--------------------------------------     AccrualEntry      ---------------------------------------------------------
/// A reward computed by the accrual service for one order, awaiting (or having received) credit to the owner's
/// balance. There is at most one entry per order.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct AccrualEntry {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: i64,
    pub amount: Points,
    pub applied: bool,
    pub created_at: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
}

//--------------------------------------   WithdrawalStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum WithdrawalStatus {
    /// The withdrawal is being processed. Only ever visible inside the withdrawal transaction.
    Processing,
    /// The balance was debited.
    Processed,
    /// The withdrawal was rejected. The balance is unchanged.
    Invalid,
}

impl Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalStatus::Processing => write!(f, "PROCESSING"),
            WithdrawalStatus::Processed => write!(f, "PROCESSED"),
            WithdrawalStatus::Invalid => write!(f, "INVALID"),
        }
    }
}

impl FromStr for WithdrawalStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(Self::Processing),
            "PROCESSED" => Ok(Self::Processed),
            "INVALID" => Ok(Self::Invalid),
            s => Err(ConversionError(format!("Invalid withdrawal status: {s}"))),
        }
    }
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    /// The order number the points were spent on. This doubles as the idempotency key for the withdrawal.
    pub order_id: OrderId,
    pub user_id: i64,
    pub amount: Points,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     NewWithdrawal     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub order_id: OrderId,
    pub user_id: i64,
    pub amount: Points,
}

impl NewWithdrawal {
    pub fn new<O: Into<OrderId>>(order_id: O, user_id: i64, amount: Points) -> Self {
        Self { order_id: order_id.into(), user_id, amount }
    }
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub login: String,
    /// Current spendable balance. Never negative.
    pub balance: Points,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
