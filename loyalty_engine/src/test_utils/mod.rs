//! Helpers for tests that run against a real SQLite database and a scripted accrual service.
pub mod prepare_env;
mod scripted_gateway;

pub use scripted_gateway::ScriptedGateway;
