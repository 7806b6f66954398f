use crate::{AccrualApiError, AccrualResponse};

/// The reconciler's view of the accrual service.
///
/// Implementations must treat every failure to obtain a well-formed answer (connection errors, timeouts, non-200
/// responses and unparseable bodies) as an error, so that the caller can retry the order on its next pass.
#[allow(async_fn_in_trait)]
pub trait AccrualGateway {
    async fn fetch_accrual(&self, order_id: &str) -> Result<AccrualResponse, AccrualApiError>;
}
