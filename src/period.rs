//! Period buckets keying the collection dataset.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INVALID_PERIOD_MESSAGE: &str = "Invalid time period requested";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "30d")]
    D30,
}

pub const ALL_PERIODS: [Period; 5] = [Period::H1, Period::H6, Period::H24, Period::D7, Period::D30];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid time period requested")]
    InvalidPeriod(String),
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H1 => "1h",
            Self::H6 => "6h",
            Self::H24 => "24h",
            Self::D7 => "7d",
            Self::D30 => "30d",
        }
    }

    /// Number of raw chart samples averaged into one sparkline point.
    pub fn window_size(self) -> usize {
        match self {
            Self::H1 => 12,
            Self::H6 => 6,
            Self::H24 => 24,
            Self::D7 => 7,
            Self::D30 => 30,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn parse_period(input: &str) -> Result<Period, PeriodError> {
    match input {
        "1h" => Ok(Period::H1),
        "6h" => Ok(Period::H6),
        "24h" => Ok(Period::H24),
        "7d" => Ok(Period::D7),
        "30d" => Ok(Period::D30),
        other => Err(PeriodError::InvalidPeriod(other.to_string())),
    }
}

/// Period selected by the dashboard page; anything unrecognized shows `1h`.
pub fn current_period(query: Option<&str>) -> Period {
    query
        .and_then(|raw| parse_period(raw).ok())
        .unwrap_or(Period::H1)
}
