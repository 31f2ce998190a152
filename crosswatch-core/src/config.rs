//! Analysis configuration: indicator periods and confirmation rules.
//!
//! Loaded from TOML. Every field has a default, so a config file only needs
//! to name what it overrides:
//!
//! ```toml
//! [indicators]
//! short_ma = 20
//! long_ma = 100
//!
//! [confirmation]
//! time_window_days = 15
//! threshold = 0.7
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Periods fed to the standard indicator engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    pub short_ma: usize,
    pub long_ma: usize,
    pub rsi: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger: usize,
    pub bollinger_multiplier: f64,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            short_ma: 50,
            long_ma: 200,
            rsi: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger: 20,
            bollinger_multiplier: 2.0,
        }
    }
}

impl IndicatorPeriods {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("short_ma", self.short_ma),
            ("long_ma", self.long_ma),
            ("rsi", self.rsi),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger", self.bollinger),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ConfigError::Invalid(format!("indicators.{name} must be >= 1")));
        }
        if self.short_ma >= self.long_ma {
            return Err(ConfigError::Invalid(format!(
                "indicators.short_ma ({}) must be < long_ma ({})",
                self.short_ma, self.long_ma
            )));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::Invalid(format!(
                "indicators.macd_fast ({}) must be < macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !(self.bollinger_multiplier > 0.0) {
            return Err(ConfigError::Invalid(
                "indicators.bollinger_multiplier must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Rules for confirming a pending cross into an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Days after a cross during which it may still be confirmed.
    pub time_window_days: u32,
    pub rsi_weight: f64,
    pub macd_weight: f64,
    pub bollinger_weight: f64,
    /// Minimum weighted score that confirms a condition.
    pub threshold: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Skip saving a cross already stored for the same (symbol, type, date).
    pub dedupe_primary: bool,
    /// Delete the symbol's conditions that fell out of the window at the end of a scan.
    pub purge_expired: bool,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            time_window_days: 10,
            rsi_weight: 0.3,
            macd_weight: 0.4,
            bollinger_weight: 0.3,
            threshold: 0.8,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            dedupe_primary: true,
            purge_expired: true,
        }
    }
}

impl ConfirmationConfig {
    /// Score when every secondary condition fires.
    pub fn max_score(&self) -> f64 {
        self.rsi_weight + self.macd_weight + self.bollinger_weight
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_window_days == 0 {
            return Err(ConfigError::Invalid(
                "confirmation.time_window_days must be >= 1".into(),
            ));
        }
        for (name, weight) in [
            ("rsi_weight", self.rsi_weight),
            ("macd_weight", self.macd_weight),
            ("bollinger_weight", self.bollinger_weight),
        ] {
            if !(weight >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "confirmation.{name} must be >= 0 (got {weight})"
                )));
            }
        }
        if !(self.threshold > 0.0 && self.threshold <= self.max_score()) {
            return Err(ConfigError::Invalid(format!(
                "confirmation.threshold ({}) must be in (0, {}]",
                self.threshold,
                self.max_score()
            )));
        }
        if !(self.rsi_oversold < self.rsi_overbought) {
            return Err(ConfigError::Invalid(format!(
                "confirmation.rsi_oversold ({}) must be < rsi_overbought ({})",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        Ok(())
    }
}

/// Complete crosswatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosswatchConfig {
    pub indicators: IndicatorPeriods,
    pub confirmation: ConfirmationConfig,
}

impl CrosswatchConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.confirmation.validate()
    }
}
