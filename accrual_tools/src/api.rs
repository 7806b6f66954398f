use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};

use crate::{config::AccrualConfig, AccrualApiError, AccrualGateway, AccrualResponse};

const ORDERS_PATH: &str = "/api/orders/";

#[derive(Clone)]
pub struct AccrualApi {
    config: AccrualConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for AccrualApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccrualApi ({})", self.config.base_url)
    }
}

impl AccrualApi {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, order_id: &str) -> String {
        format!("{}{ORDERS_PATH}{order_id}", self.config.base_url.trim_end_matches('/'))
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    /// Asks the accrual service for its current judgement of `order_id`.
    ///
    /// Only a `200 OK` with a well-formed body is a valid answer. Everything else, including `204 No Content` for
    /// orders the service has not seen yet and `429 Too Many Requests`, is reported as
    /// [`AccrualApiError::UnexpectedStatus`].
    pub async fn get_accrual(&self, order_id: &str) -> Result<AccrualResponse, AccrualApiError> {
        let url = self.url(order_id);
        trace!("📡️ Requesting accrual: {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::OK {
            let body = response.text().await?;
            let result = serde_json::from_str::<AccrualResponse>(&body)
                .map_err(|e| AccrualApiError::JsonError(format!("{e}. Body: {body}")))?;
            debug!("📡️ Accrual for order {order_id}: {} ({:?})", result.status, result.accrual);
            Ok(result)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AccrualApiError::UnexpectedStatus { status: status.as_u16(), body })
        }
    }
}

impl AccrualGateway for AccrualApi {
    async fn fetch_accrual(&self, order_id: &str) -> Result<AccrualResponse, AccrualApiError> {
        self.get_accrual(order_id).await
    }
}
