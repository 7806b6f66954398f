use std::{env, time::Duration};

use log::*;

const DEFAULT_ACCRUAL_SYSTEM_ADDRESS: &str = "http://localhost:3000";
const DEFAULT_ACCRUAL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    /// The base URL of the accrual service, e.g. "http://localhost:3000"
    pub base_url: String,
    /// Upper bound on a single request. A request that takes longer is treated as if the service were unavailable.
    pub timeout: Duration,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_ACCRUAL_SYSTEM_ADDRESS.to_string(), timeout: DEFAULT_ACCRUAL_TIMEOUT }
    }
}

impl AccrualConfig {
    pub fn new<S: Into<String>>(base_url: S, timeout: Duration) -> Self {
        Self { base_url: base_url.into(), timeout }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = env::var("LPG_ACCRUAL_SYSTEM_ADDRESS").unwrap_or_else(|_| {
            warn!("🪛️ LPG_ACCRUAL_SYSTEM_ADDRESS not set, using {DEFAULT_ACCRUAL_SYSTEM_ADDRESS} as default");
            DEFAULT_ACCRUAL_SYSTEM_ADDRESS.to_string()
        });
        let timeout = env::var("LPG_ACCRUAL_TIMEOUT")
            .ok()
            .and_then(|s| match s.parse::<u64>() {
                Ok(0) | Err(_) => {
                    error!("🪛️ {s} is not a valid value for LPG_ACCRUAL_TIMEOUT. Using the default instead.");
                    None
                },
                Ok(secs) => Some(Duration::from_secs(secs)),
            })
            .unwrap_or(DEFAULT_ACCRUAL_TIMEOUT);
        Self { base_url, timeout }
    }
}
