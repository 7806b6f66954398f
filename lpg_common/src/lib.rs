//! Common types shared by the Loyalty Points Gateway crates.
//!
//! * [`Points`] is the fixed-point amount used for every balance, accrual and withdrawal.
//! * [`luhn`] validates order numbers.
//! * [`Secret`] keeps sensitive values out of logs.
mod helpers;
mod points;
mod secret;

pub mod luhn;
pub mod op;

pub use helpers::parse_boolean_flag;
pub use points::{Points, PointsConversionError, POINTS_SCALE};
pub use secret::Secret;
