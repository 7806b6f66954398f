//! # Accrual service tools
//!
//! A thin client for the external accrual service that judges each uploaded order. The service answers
//! `GET {base}/api/orders/{order_id}` with the order's accrual status and, once the calculation is complete, the
//! number of points awarded.
//!
//! The [`AccrualGateway`] trait is what the reconciler depends on. [`AccrualApi`] is the HTTP implementation.
mod api;
mod config;
mod data_objects;
mod error;
mod gateway;

pub use api::AccrualApi;
pub use config::AccrualConfig;
pub use data_objects::{AccrualResponse, AccrualStatus};
pub use error::AccrualApiError;
pub use gateway::AccrualGateway;
