use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// Number of stored units in one loyalty point. Amounts carry two decimal places.
pub const POINTS_SCALE: i64 = 100;

//--------------------------------------       Points        ---------------------------------------------------------
/// A loyalty point amount, stored as an integer number of hundredths of a point so that addition and subtraction
/// are exact.
///
/// In JSON, amounts are rendered as plain decimal numbers (e.g. `500`, `42.5`), which is what the accrual service
/// and API clients use.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct Points(i64);

op!(Points => Add::add, Sub::sub);
op!(assign Points => AddAssign::add_assign, SubAssign::sub_assign);
op!(neg Points);

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value cannot be represented as a points amount: {0}")]
pub struct PointsConversionError(String);

impl Points {
    pub const ZERO: Points = Points(0);
    /// The largest amount a single accrual or balance may hold: ten trillion points. Keeping every amount well inside
    /// `i64` means sums of a few of them can never overflow.
    pub const MAX: Points = Points(1_000_000_000_000_000);

    pub fn from_hundredths(value: i64) -> Self {
        Self(value)
    }

    pub fn from_whole(points: i64) -> Self {
        Self(points * POINTS_SCALE)
    }

    /// The raw amount, in hundredths of a point
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, returning `None` if the result would overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / POINTS_SCALE as f64
    }
}

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self::from_whole(value)
    }
}

/// Converts a decimal amount, rounding to the nearest hundredth. Amounts beyond [`Points::MAX`] in either direction
/// are rejected.
impl TryFrom<f64> for Points {
    type Error = PointsConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(PointsConversionError(format!("{value} is not a finite number")));
        }
        let scaled = (value * POINTS_SCALE as f64).round();
        if scaled.abs() > Points::MAX.0 as f64 {
            return Err(PointsConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(scaled as i64))
    }
}

impl FromStr for Points {
    type Err = PointsConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<f64>().map_err(|e| PointsConversionError(format!("{s}: {e}")))?;
        Self::try_from(value)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = POINTS_SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02} pts", abs / scale, abs % scale)
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % POINTS_SCALE == 0 {
            serializer.serialize_i64(self.0 / POINTS_SCALE)
        } else {
            serializer.serialize_f64(self.to_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Points::try_from(value).map_err(DeError::custom)
    }
}
