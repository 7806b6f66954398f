//! # Loyalty Points Gateway server
//! This crate hosts the server code for the Loyalty Points Gateway. It is responsible for:
//! * Accepting order uploads and withdrawal requests from authenticated users.
//! * Serving balances, orders and withdrawal history.
//! * Running the background workers that reconcile orders with the accrual service and credit balances.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/user/orders`: Upload an order number (plain text body).
//! * `GET /api/user/orders`: The current user's orders.
//! * `GET /api/user/balance`: The current user's balance and total withdrawn.
//! * `POST /api/user/balance/withdraw`: Spend points against an order number.
//! * `GET /api/user/withdrawals`: The current user's withdrawals.
//!
//! Every `/api` route requires the `lpg_remember` session cookie.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod workers;

#[cfg(test)]
mod endpoint_tests;
