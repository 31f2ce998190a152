//! Alert: the output of a confirmed primary condition.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::condition::ConditionType;

/// Direction of a confirmed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Entry,
    Exit,
}

impl SignalType {
    /// The primary condition that confirms into this signal.
    pub fn primary(&self) -> ConditionType {
        match self {
            SignalType::Entry => ConditionType::GoldenCross,
            SignalType::Exit => ConditionType::DeathCross,
        }
    }
}

impl From<ConditionType> for SignalType {
    fn from(condition: ConditionType) -> Self {
        match condition {
            ConditionType::GoldenCross => SignalType::Entry,
            ConditionType::DeathCross => SignalType::Exit,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Entry => write!(f, "ENTRY"),
            SignalType::Exit => write!(f, "EXIT"),
        }
    }
}

/// A confirmed entry or exit signal with the indicator readings of the confirming day.
///
/// `band` is the upper Bollinger band for entries and the lower band for exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub signal_type: SignalType,
    pub symbol: String,
    pub date: NaiveDate,
    pub short_ma: f64,
    pub long_ma: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub band: f64,
    pub score: f64,
    pub reasoning: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} SIGNAL on {} for {}: short MA = {:.2}, long MA = {:.2}, RSI = {:.2}, \
             MACD = {:.2} (signal {:.2}), band = {:.2}, score = {:.2}. Reasoning: {}",
            self.signal_type,
            self.date,
            self.symbol,
            self.short_ma,
            self.long_ma,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.band,
            self.score,
            self.reasoning
        )
    }
}
