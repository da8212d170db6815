use std::{fmt::Display, ops::Deref, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const MIN_COST: i64 = 0;
pub const MAX_COST: i64 = 10_000;

/// Default currency-per-hour used to suggest a cost for a session.
pub const DEFAULT_HOURLY_RATE: u32 = 500;

/// Amount of money spent during a session. Always within [MIN_COST] and [MAX_COST].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Cost(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostError {
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("cost must be between {MIN_COST} and {MAX_COST}, got {0}")]
    OutOfRange(i64),
}

impl Cost {
    pub const ZERO: Cost = Cost(0);

    pub fn new(value: i64) -> Result<Cost, CostError> {
        if (MIN_COST..=MAX_COST).contains(&value) {
            Ok(Cost(value))
        } else {
            Err(CostError::OutOfRange(value))
        }
    }

    pub fn clamped(value: i64) -> Cost {
        Cost(value.clamp(MIN_COST, MAX_COST))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cost {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let v = s
            .parse::<i64>()
            .map_err(|_| CostError::NotANumber(s.to_string()))?;
        Cost::new(v)
    }
}

impl TryFrom<i64> for Cost {
    type Error = CostError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Cost::new(value)
    }
}

impl From<Cost> for i64 {
    fn from(value: Cost) -> Self {
        value.0
    }
}

impl Deref for Cost {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Price of `duration_minutes` at `hourly_rate` before any bounds apply. Fractions are truncated.
pub fn rated_cost(duration_minutes: i64, hourly_rate: u32) -> i64 {
    duration_minutes.max(0) * hourly_rate as i64 / 60
}

/// Cost suggested for a session of `duration_minutes` at `hourly_rate`, capped at [MAX_COST].
pub fn default_cost(duration_minutes: i64, hourly_rate: u32) -> Cost {
    let rated = rated_cost(duration_minutes, hourly_rate);
    let cost = Cost::clamped(rated);
    if *cost != rated {
        warn!("Suggested cost {rated} for {duration_minutes} minutes was capped to {cost}");
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_bounds() {
        assert_eq!("0".parse::<Cost>(), Ok(Cost::ZERO));
        assert_eq!("10000".parse::<Cost>().map(|v| *v), Ok(10_000));
        assert_eq!("10001".parse::<Cost>(), Err(CostError::OutOfRange(10_001)));
        assert_eq!("-1".parse::<Cost>(), Err(CostError::OutOfRange(-1)));
    }

    #[test]
    fn test_cost_parse_trims_and_rejects_text() {
        assert_eq!(" 750 \n".parse::<Cost>().map(|v| *v), Ok(750));
        assert_eq!(
            "seven".parse::<Cost>(),
            Err(CostError::NotANumber("seven".into()))
        );
        assert!("12.5".parse::<Cost>().is_err());
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(*default_cost(90, DEFAULT_HOURLY_RATE), 750);
        assert_eq!(*default_cost(0, DEFAULT_HOURLY_RATE), 0);
        // 7 minutes at 500/h is 58.33
        assert_eq!(*default_cost(7, DEFAULT_HOURLY_RATE), 58);
        // a forgotten session suggests the largest accepted value
        assert_eq!(*default_cost(60 * 48, DEFAULT_HOURLY_RATE), MAX_COST);
    }

    #[test]
    fn test_rated_cost_is_not_capped() {
        assert_eq!(rated_cost(60 * 25, DEFAULT_HOURLY_RATE), 12_500);
        assert_eq!(*default_cost(60 * 25, DEFAULT_HOURLY_RATE), MAX_COST);
        assert_eq!(rated_cost(60 * 20, DEFAULT_HOURLY_RATE), 10_000);
        assert_eq!(*default_cost(60 * 20, DEFAULT_HOURLY_RATE), 10_000);
        assert_eq!(rated_cost(-5, DEFAULT_HOURLY_RATE), 0);
    }

    #[test]
    fn test_cost_deserialize_checks_range() {
        assert!(serde_json::from_str::<Cost>("250").is_ok());
        assert!(serde_json::from_str::<Cost>("20000").is_err());
    }
}
