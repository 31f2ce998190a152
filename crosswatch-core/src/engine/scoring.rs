//! Weighted secondary-condition scoring.
//!
//! Entry (golden cross) and exit (death cross) each check three secondary
//! conditions on the confirming day:
//!
//! | weight    | entry                          | exit                           |
//! |-----------|--------------------------------|--------------------------------|
//! | RSI       | rsi < oversold                 | rsi > overbought               |
//! | MACD      | fresh cross above signal line  | fresh cross below signal line  |
//! | Bollinger | close > upper band             | close < lower band             |
//!
//! A fresh MACD cross needs the previous day's readings; on the first day of
//! a series it never fires.

use super::snapshot::IndicatorSnapshot;
use crate::config::ConfirmationConfig;
use crate::domain::SignalType;

/// Which secondary conditions fired on a day, and their weighted sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfirmationScore {
    pub rsi: bool,
    pub macd: bool,
    pub bollinger: bool,
    pub total: f64,
}

impl ConfirmationScore {
    /// Weigh a set of fired conditions.
    ///
    /// Weights are summed in a fixed order so that "all fired" equals
    /// `ConfirmationConfig::max_score` exactly.
    pub fn weigh(rsi: bool, macd: bool, bollinger: bool, config: &ConfirmationConfig) -> Self {
        let mut total = 0.0;
        if rsi {
            total += config.rsi_weight;
        }
        if macd {
            total += config.macd_weight;
        }
        if bollinger {
            total += config.bollinger_weight;
        }
        Self {
            rsi,
            macd,
            bollinger,
            total,
        }
    }

    pub fn confirms(&self, config: &ConfirmationConfig) -> bool {
        self.total >= config.threshold
    }

    pub fn fired_count(&self) -> usize {
        [self.rsi, self.macd, self.bollinger]
            .iter()
            .filter(|fired| **fired)
            .count()
    }

    /// Primary label followed by the labels of the secondary conditions that fired.
    pub fn reasoning(&self, signal: SignalType) -> String {
        let (rsi, macd, bollinger) = secondary_labels(signal);
        let mut parts = vec![signal.primary().label()];
        if self.rsi {
            parts.push(rsi);
        }
        if self.macd {
            parts.push(macd);
        }
        if self.bollinger {
            parts.push(bollinger);
        }
        parts.join(", ")
    }
}

fn secondary_labels(signal: SignalType) -> (&'static str, &'static str, &'static str) {
    match signal {
        SignalType::Entry => ("RSI Oversold", "MACD Bullish", "Bollinger Breakout"),
        SignalType::Exit => ("RSI Overbought", "MACD Bearish", "Bollinger Breakdown"),
    }
}

/// Score the bullish secondary conditions on `today`.
pub fn entry_score(
    prev: Option<&IndicatorSnapshot>,
    today: &IndicatorSnapshot,
    config: &ConfirmationConfig,
) -> ConfirmationScore {
    let rsi = today.rsi < config.rsi_oversold;
    let macd = today.macd > today.macd_signal
        && prev.is_some_and(|p| p.has_macd() && p.macd <= p.macd_signal);
    let bollinger = today.close > today.bollinger_upper;
    ConfirmationScore::weigh(rsi, macd, bollinger, config)
}

/// Score the bearish secondary conditions on `today`.
pub fn exit_score(
    prev: Option<&IndicatorSnapshot>,
    today: &IndicatorSnapshot,
    config: &ConfirmationConfig,
) -> ConfirmationScore {
    let rsi = today.rsi > config.rsi_overbought;
    let macd = today.macd < today.macd_signal
        && prev.is_some_and(|p| p.has_macd() && p.macd >= p.macd_signal);
    let bollinger = today.close < today.bollinger_lower;
    ConfirmationScore::weigh(rsi, macd, bollinger, config)
}

/// Score for the signal a pending condition would confirm into.
pub fn score(
    signal: SignalType,
    prev: Option<&IndicatorSnapshot>,
    today: &IndicatorSnapshot,
    config: &ConfirmationConfig,
) -> ConfirmationScore {
    match signal {
        SignalType::Entry => entry_score(prev, today, config),
        SignalType::Exit => exit_score(prev, today, config),
    }
}
