use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use accrual_tools::{AccrualApiError, AccrualGateway, AccrualResponse};

/// An in-memory accrual service. Orders without a scripted answer get a `204 No Content`, the same as the real
/// service gives for orders it has never seen.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGateway {
    responses: Arc<Mutex<HashMap<String, Result<AccrualResponse, AccrualApiError>>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, response: AccrualResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(response.order.clone(), Ok(response));
    }

    pub fn fail(&self, order_id: &str, error: AccrualApiError) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(order_id.to_string(), Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AccrualGateway for ScriptedGateway {
    async fn fetch_accrual(&self, order_id: &str) -> Result<AccrualResponse, AccrualApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let responses = self.responses.lock().unwrap();
        responses
            .get(order_id)
            .cloned()
            .unwrap_or(Err(AccrualApiError::UnexpectedStatus { status: 204, body: String::new() }))
    }
}
