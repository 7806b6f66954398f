use std::fmt::Display;

use lpg_common::Points;
use serde::{Deserialize, Serialize};

/// The accrual service's judgement of an order.
///
/// Any other value in a response is a malformed response, and is rejected when the body is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    /// The order is known to the service, but the calculation has not started.
    Registered,
    /// The order is not eligible for points. Final.
    Invalid,
    /// The calculation is in progress.
    Processing,
    /// The calculation is complete and `accrual` holds the result. Final.
    Processed,
}

impl Display for AccrualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "REGISTERED"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Processing => write!(f, "PROCESSING"),
            Self::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualResponse {
    pub order: String,
    pub status: AccrualStatus,
    /// Only present when `status` is `PROCESSED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

impl AccrualResponse {
    pub fn new<S: Into<String>>(order: S, status: AccrualStatus) -> Self {
        Self { order: order.into(), status, accrual: None }
    }

    pub fn processed<S: Into<String>>(order: S, accrual: Points) -> Self {
        Self { order: order.into(), status: AccrualStatus::Processed, accrual: Some(accrual) }
    }
}
