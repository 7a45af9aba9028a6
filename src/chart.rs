//! Floor-chart downsampling and trend classification for sparklines.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::period::parse_period;

pub const DEFAULT_WINDOW_SIZE: usize = 12;
pub const UP_COLOR: &str = "hsl(125, 64%, 44%)";
pub const DOWN_COLOR: &str = "hsl(347, 77%, 50%)";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("window size must be greater than 0, got {0}")]
    NonPositiveWindow(i64),
    #[error("cannot classify trend of an empty series")]
    EmptySeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize(NonZeroUsize);

impl WindowSize {
    pub fn new(raw: i64) -> Result<Self, ChartError> {
        usize::try_from(raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(ChartError::NonPositiveWindow(raw))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradingDirection {
    pub direction: Direction,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sparkline {
    pub window_size: usize,
    pub x: Vec<usize>,
    pub y: Vec<f64>,
    pub direction: Direction,
    pub color: &'static str,
}

/// Window size for a period label; unrecognized labels use 12.
pub fn window_size_for_label(label: &str) -> usize {
    parse_period(label)
        .map(|period| period.window_size())
        .unwrap_or(DEFAULT_WINDOW_SIZE)
}

/// Contiguous, non-overlapping windows; only the last may be short.
pub fn partition_windows(data: &[f64], size: WindowSize) -> impl Iterator<Item = &[f64]> {
    data.chunks(size.get())
}

pub fn average_over_window(data: &[f64], size: WindowSize) -> Vec<f64> {
    partition_windows(data, size)
        .map(|window| window.iter().sum::<f64>() / window.len() as f64)
        .collect()
}

/// Last sample strictly below the first is `Down`; ties are `Up`.
pub fn trading_direction(data: &[f64]) -> Result<TradingDirection, ChartError> {
    let (first, last) = match (data.first(), data.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(ChartError::EmptySeries),
    };

    Ok(if last < first {
        TradingDirection {
            direction: Direction::Down,
            color: DOWN_COLOR,
        }
    } else {
        TradingDirection {
            direction: Direction::Up,
            color: UP_COLOR,
        }
    })
}

pub fn build_sparkline(data: &[f64], period_label: &str) -> Result<Sparkline, ChartError> {
    let trend = trading_direction(data)?;
    let size = WindowSize::new(window_size_for_label(period_label) as i64)?;
    let y = average_over_window(data, size);
    let x = (1..=y.len()).collect();

    Ok(Sparkline {
        window_size: size.get(),
        x,
        y,
        direction: trend.direction,
        color: trend.color,
    })
}
