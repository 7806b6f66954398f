use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccrualApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Accrual service is unavailable: {0}")]
    Unavailable(String),
    #[error("Accrual service did not respond in time")]
    Timeout,
    #[error("Unexpected response from accrual service. Error {status}. {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
}

impl From<reqwest::Error> for AccrualApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::JsonError(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}
