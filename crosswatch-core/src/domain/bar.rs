//! PriceBar: one trading day of a single symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar. The symbol travels alongside the series, not in each bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Structural problems with a price series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("bar {index} ({date}) is dated before the bar preceding it")]
    OutOfOrder { index: usize, date: NaiveDate },

    #[error("duplicate bar for {date}")]
    DuplicateDate { date: NaiveDate },
}

/// Check that a series is strictly chronological.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), SeriesError> {
    for (index, pair) in bars.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.date == prev.date {
            return Err(SeriesError::DuplicateDate { date: cur.date });
        }
        if cur.date < prev.date {
            return Err(SeriesError::OutOfOrder {
                index: index + 1,
                date: cur.date,
            });
        }
    }
    Ok(())
}
