//! Moving Average Convergence Divergence (MACD).
//!
//! Two lines (separate Indicator instances, like the Bollinger bands):
//! - Macd: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(macd, signal_period), seeded on the first `signal_period` defined MACD values
//!
//! Lookback: slow - 1 for the MACD line, slow + signal - 2 for the signal line.

use crate::components::indicator::Indicator;
use crate::domain::PriceBar;

use super::closes;
use super::ema::ema_of_series;

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    fn with_line(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        let prefix = match line {
            MacdLine::Macd => "macd",
            MacdLine::Signal => "macd_signal",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_line(fast, slow, signal, MacdLine::Macd)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_line(fast, slow, signal, MacdLine::Signal)
    }

    fn macd_series(&self, closes: &[f64]) -> Vec<f64> {
        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }

    fn signal_series(&self, macd: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; macd.len()];
        // The MACD line is NaN until the slow EMA is seeded; start the signal EMA there.
        let Some(start) = macd.iter().position(|v| !v.is_nan()) else {
            return result;
        };
        let tail = ema_of_series(&macd[start..], self.signal);
        result[start..].copy_from_slice(&tail);
        result
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let macd = self.macd_series(&closes(bars));
        match self.line {
            MacdLine::Macd => macd,
            MacdLine::Signal => self.signal_series(&macd),
        }
    }
}
