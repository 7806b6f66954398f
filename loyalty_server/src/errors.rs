use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use loyalty_engine::{
    traits::{AccountApiError, LedgerError},
    OrderUploadError,
    WithdrawalError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Authentication required. {0}")]
    Unauthenticated(String),
    #[error("Order number is not valid: {0}")]
    InvalidOrderNumber(String),
    #[error("Order {0} has already been uploaded by another user")]
    OrderOwnedByAnotherUser(String),
    #[error("Order {0} has already been withdrawn against")]
    WithdrawalAlreadyProcessed(String),
    #[error("Withdrawal amount is not valid. {0}")]
    InvalidAmount(String),
    #[error("Insufficient funds. {0}")]
    InsufficientFunds(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderOwnedByAnotherUser(_) => StatusCode::CONFLICT,
            Self::WithdrawalAlreadyProcessed(_) => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        Self::BackendError(e.to_string())
    }
}

/// `AlreadyUploadedByUser` is not an error at the HTTP level, so handlers must deal with it before converting.
impl From<OrderUploadError> for ServerError {
    fn from(e: OrderUploadError) -> Self {
        match e {
            OrderUploadError::InvalidOrderNumber(n) => Self::InvalidOrderNumber(n),
            OrderUploadError::OwnedByAnotherUser(id) => Self::OrderOwnedByAnotherUser(id.0),
            OrderUploadError::AlreadyUploadedByUser(order) => {
                Self::BackendError(format!("Unhandled duplicate upload of order {}", order.order_id))
            },
            OrderUploadError::Backend(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<WithdrawalError> for ServerError {
    fn from(e: WithdrawalError) -> Self {
        match e {
            WithdrawalError::InvalidOrderNumber(n) => Self::InvalidOrderNumber(n),
            WithdrawalError::NegativeAmount(_) => Self::InvalidAmount(e.to_string()),
            WithdrawalError::AlreadyProcessed(id) => Self::WithdrawalAlreadyProcessed(id.0),
            WithdrawalError::InsufficientFunds { .. } => Self::InsufficientFunds(e.to_string()),
            WithdrawalError::UserNotFound(_) => Self::BackendError(e.to_string()),
            WithdrawalError::Backend(msg) => Self::BackendError(msg),
        }
    }
}
