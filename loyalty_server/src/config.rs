use std::{env, time::Duration};

use accrual_tools::AccrualConfig;
use log::*;
use lpg_common::parse_boolean_flag;

const DEFAULT_LPG_HOST: &str = "127.0.0.1";
const DEFAULT_LPG_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_BALANCE_UPDATE_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// If true, pending database migrations are applied when the server starts.
    pub auto_migrate: bool,
    pub accrual: AccrualConfig,
    pub workers: WorkerConfig,
}

#[derive(Clone, Copy, Debug)]
pub struct WorkerConfig {
    /// If true, the reconciler and balance materializer are not started. Orders will not progress, and balances will
    /// not be credited, until a server with workers enabled runs against the same database.
    pub disabled: bool,
    /// The pause between the end of one reconciliation sweep and the start of the next.
    pub poll_interval: Duration,
    /// The balance materializer tick.
    pub balance_update_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            balance_update_interval: DEFAULT_BALANCE_UPDATE_INTERVAL,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LPG_HOST.to_string(),
            port: DEFAULT_LPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auto_migrate: true,
            accrual: AccrualConfig::default(),
            workers: WorkerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LPG_HOST").ok().unwrap_or_else(|| DEFAULT_LPG_HOST.into());
        let port = env::var("LPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LPG_PORT. {e} Using the default, {DEFAULT_LPG_PORT}, instead."
                    );
                    DEFAULT_LPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LPG_PORT);
        let database_url = env::var("LPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env::var("LPG_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| match s.parse::<u32>() {
                Ok(0) | Err(_) => {
                    error!("🪛️ {s} is not a valid value for LPG_DB_MAX_CONNECTIONS. Using the default instead.");
                    None
                },
                Ok(n) => Some(n),
            })
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let auto_migrate = parse_boolean_flag(env::var("LPG_AUTO_MIGRATE").ok(), true);
        let accrual = AccrualConfig::new_from_env_or_default();
        let workers = WorkerConfig::from_env_or_default();
        Self { host, port, database_url, max_connections, auto_migrate, accrual, workers }
    }
}

impl WorkerConfig {
    pub fn from_env_or_default() -> Self {
        let disabled = parse_boolean_flag(env::var("LPG_DISABLE_WORKERS").ok(), false);
        if disabled {
            warn!("🪛️ Background workers are disabled. Orders will not be reconciled, nor balances updated.");
        }
        let poll_interval = interval_from_env("LPG_ACCRUAL_POLL_INTERVAL", DEFAULT_POLL_INTERVAL);
        let balance_update_interval = interval_from_env("LPG_BALANCE_UPDATE_INTERVAL", DEFAULT_BALANCE_UPDATE_INTERVAL);
        Self { disabled, poll_interval, balance_update_interval }
    }
}

/// Reads a positive number of milliseconds from the environment.
fn interval_from_env(var: &str, default: Duration) -> Duration {
    match env::var(var) {
        Err(_) => {
            info!("🪛️ {var} is not set. Using the default value of {}ms.", default.as_millis());
            default
        },
        Ok(s) => parse_interval(&s).unwrap_or_else(|| {
            error!("🪛️ {s} is not a valid value for {var}. Using the default value of {}ms.", default.as_millis());
            default
        }),
    }
}

fn parse_interval(s: &str) -> Option<Duration> {
    match s.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
    }
}
