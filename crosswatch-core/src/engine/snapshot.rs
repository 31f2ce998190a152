//! Per-day indicator readings consumed by the confirmation engine.
//!
//! The engine never computes indicators itself; it asks an `IndicatorEngine`
//! for one snapshot per bar. `StandardIndicatorEngine` precomputes every
//! series once with the `Indicator` implementations and zips them by index.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::config::IndicatorPeriods;
use crate::domain::PriceBar;
use crate::indicators::{Bollinger, Macd, Rsi, Sma};

/// Indicator readings for one day. Undefined values (warmup) are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub bollinger_upper: f64,
    pub bollinger_middle: f64,
    pub bollinger_lower: f64,
}

impl IndicatorSnapshot {
    /// A day with a close but no indicator readings yet.
    pub fn undefined(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            short_ma: f64::NAN,
            long_ma: f64::NAN,
            rsi: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
            bollinger_upper: f64::NAN,
            bollinger_middle: f64::NAN,
            bollinger_lower: f64::NAN,
        }
    }

    /// Both moving averages are usable for cross detection.
    pub fn has_moving_averages(&self) -> bool {
        self.short_ma.is_finite() && self.long_ma.is_finite()
    }

    /// MACD and its signal line are both usable.
    pub fn has_macd(&self) -> bool {
        self.macd.is_finite() && self.macd_signal.is_finite()
    }

    /// Every reading is finite.
    pub fn is_defined(&self) -> bool {
        self.close.is_finite()
            && self.has_moving_averages()
            && self.rsi.is_finite()
            && self.has_macd()
            && self.bollinger_upper.is_finite()
            && self.bollinger_middle.is_finite()
            && self.bollinger_lower.is_finite()
    }
}

/// Source of per-day indicator readings.
///
/// Implementations must return exactly one snapshot per bar, in bar order,
/// and a snapshot at day i may only depend on bars 0..=i.
pub trait IndicatorEngine: Send + Sync {
    fn snapshots(&self, bars: &[PriceBar]) -> Vec<IndicatorSnapshot>;
}

/// Indicator engine backed by the crate's SMA, RSI, MACD and Bollinger implementations.
#[derive(Debug, Clone)]
pub struct StandardIndicatorEngine {
    periods: IndicatorPeriods,
    short_ma: Sma,
    long_ma: Sma,
    rsi: Rsi,
    macd: Macd,
    macd_signal: Macd,
    upper: Bollinger,
    middle: Bollinger,
    lower: Bollinger,
}

impl StandardIndicatorEngine {
    /// Build the engine from validated periods.
    ///
    /// # Panics
    /// If `periods` violates `IndicatorPeriods::validate` (zero period or
    /// `macd_fast >= macd_slow`).
    pub fn new(periods: IndicatorPeriods) -> Self {
        let p = &periods;
        Self {
            short_ma: Sma::new(p.short_ma),
            long_ma: Sma::new(p.long_ma),
            rsi: Rsi::new(p.rsi),
            macd: Macd::line(p.macd_fast, p.macd_slow, p.macd_signal),
            macd_signal: Macd::signal(p.macd_fast, p.macd_slow, p.macd_signal),
            upper: Bollinger::upper(p.bollinger, p.bollinger_multiplier),
            middle: Bollinger::middle(p.bollinger, p.bollinger_multiplier),
            lower: Bollinger::lower(p.bollinger, p.bollinger_multiplier),
            periods,
        }
    }

    pub fn periods(&self) -> &IndicatorPeriods {
        &self.periods
    }

    /// Bars needed before every reading is defined.
    pub fn warmup(&self) -> usize {
        self.indicators()
            .iter()
            .map(|i| i.lookback())
            .max()
            .unwrap_or(0)
    }

    fn indicators(&self) -> [&dyn Indicator; 8] {
        [
            &self.short_ma,
            &self.long_ma,
            &self.rsi,
            &self.macd,
            &self.macd_signal,
            &self.upper,
            &self.middle,
            &self.lower,
        ]
    }
}

impl Default for StandardIndicatorEngine {
    fn default() -> Self {
        Self::new(IndicatorPeriods::default())
    }
}

impl IndicatorEngine for StandardIndicatorEngine {
    fn snapshots(&self, bars: &[PriceBar]) -> Vec<IndicatorSnapshot> {
        let values = IndicatorValues::precompute(bars, &self.indicators());
        let at = |indicator: &dyn Indicator, i: usize| values.value_or_nan(indicator.name(), i);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| IndicatorSnapshot {
                date: bar.date,
                close: bar.close,
                short_ma: at(&self.short_ma, i),
                long_ma: at(&self.long_ma, i),
                rsi: at(&self.rsi, i),
                macd: at(&self.macd, i),
                macd_signal: at(&self.macd_signal, i),
                bollinger_upper: at(&self.upper, i),
                bollinger_middle: at(&self.middle, i),
                bollinger_lower: at(&self.lower, i),
            })
            .collect()
    }
}
