//! Signal confirmation engine.
//!
//! `analyze` scans the trailing window of a price series, one day at a time:
//!
//! 1. A golden or death cross of the moving averages is saved to the store
//!    as a pending condition.
//! 2. Pending golden crosses newer than `date - window` are scored against
//!    the day's bullish secondary conditions; a score at or above the
//!    threshold emits an ENTRY alert and deletes the condition.
//! 3. Pending death crosses are handled the same way with the bearish
//!    conditions, emitting EXIT alerts.
//!
//! Conditions outside the window are never returned by `find_active`, so they
//! can no longer confirm. When `purge_expired` is set the scan ends by
//! deleting them from the store.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, trace};

use super::scoring::{self, ConfirmationScore};
use super::snapshot::{IndicatorEngine, IndicatorSnapshot, StandardIndicatorEngine};
use super::AnalyzeError;
use crate::config::{ConfigError, ConfirmationConfig, CrosswatchConfig};
use crate::domain::{validate_series, Alert, ConditionType, PendingCondition, PriceBar, SignalType};
use crate::store::{PrimaryConditionStore, StoreError};

/// Detect a moving-average cross on `today` relative to `prev`.
///
/// Golden: short > long today and short <= long yesterday.
/// Death: short < long today and short >= long yesterday.
/// Returns `None` on the first day or when either day lacks both averages.
pub fn detect_cross(
    prev: Option<&IndicatorSnapshot>,
    today: &IndicatorSnapshot,
) -> Option<ConditionType> {
    let prev = prev?;
    if !prev.has_moving_averages() || !today.has_moving_averages() {
        return None;
    }
    if today.short_ma > today.long_ma && prev.short_ma <= prev.long_ma {
        Some(ConditionType::GoldenCross)
    } else if today.short_ma < today.long_ma && prev.short_ma >= prev.long_ma {
        Some(ConditionType::DeathCross)
    } else {
        None
    }
}

/// Confirms trend crosses into entry/exit alerts.
///
/// Generic over the indicator source so tests can feed fixed readings.
#[derive(Debug, Clone)]
pub struct SignalConfirmationEngine<E = StandardIndicatorEngine> {
    config: ConfirmationConfig,
    indicators: E,
}

impl SignalConfirmationEngine<StandardIndicatorEngine> {
    /// Engine with the standard indicators built from `config.indicators`.
    ///
    /// Validates `config` first; invalid periods or weights are a `ConfigError`.
    pub fn from_config(config: &CrosswatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.confirmation.clone(),
            StandardIndicatorEngine::new(config.indicators.clone()),
        ))
    }
}

impl Default for SignalConfirmationEngine<StandardIndicatorEngine> {
    fn default() -> Self {
        Self::new(
            ConfirmationConfig::default(),
            StandardIndicatorEngine::default(),
        )
    }
}

impl<E: IndicatorEngine> SignalConfirmationEngine<E> {
    pub fn new(config: ConfirmationConfig, indicators: E) -> Self {
        Self { config, indicators }
    }

    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }

    pub fn indicators(&self) -> &E {
        &self.indicators
    }

    /// Earliest date excluded from the window ending at `date`.
    ///
    /// Conditions must have occurred strictly after this to be confirmable.
    pub fn window_start(&self, date: NaiveDate) -> NaiveDate {
        date.checked_sub_signed(Duration::days(i64::from(self.config.time_window_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Scan the trailing window of `bars` for `symbol` and return confirmed alerts.
    ///
    /// Mutates `store`: saves detected crosses, deletes confirmed ones and,
    /// with `purge_expired`, sweeps the symbol's conditions that left the
    /// window.
    ///
    /// A store failure aborts the scan. Conditions already confirmed have
    /// been deleted by then, so their alerts travel inside
    /// `AnalyzeError::Store`.
    pub fn analyze<S>(
        &self,
        store: &mut S,
        bars: &[PriceBar],
        symbol: &str,
    ) -> Result<Vec<Alert>, AnalyzeError>
    where
        S: PrimaryConditionStore + ?Sized,
    {
        validate_series(bars)?;
        let snapshots = self.indicators.snapshots(bars);
        debug_assert_eq!(snapshots.len(), bars.len());

        let Some(last) = snapshots.len().checked_sub(1) else {
            return Ok(Vec::new());
        };
        let start = last.saturating_sub(self.config.time_window_days as usize);
        debug!(
            symbol,
            bars = bars.len(),
            from = %snapshots[start].date,
            to = %snapshots[last].date,
            "scanning window"
        );

        let mut alerts = Vec::new();
        match self.scan(store, &snapshots, start, symbol, &mut alerts) {
            Ok(()) => Ok(alerts),
            Err(source) => Err(AnalyzeError::Store { source, alerts }),
        }
    }

    fn scan<S>(
        &self,
        store: &mut S,
        snapshots: &[IndicatorSnapshot],
        start: usize,
        symbol: &str,
        alerts: &mut Vec<Alert>,
    ) -> Result<(), StoreError>
    where
        S: PrimaryConditionStore + ?Sized,
    {
        let last = snapshots.len() - 1;
        for i in start..=last {
            let prev = i.checked_sub(1).map(|p| &snapshots[p]);
            let today = &snapshots[i];

            if let Some(condition_type) = detect_cross(prev, today) {
                self.record_primary(store, symbol, condition_type, today.date)?;
            }

            if !today.is_defined() {
                trace!(symbol, date = %today.date, "indicators undefined, skipping confirmation");
                continue;
            }

            for condition_type in [ConditionType::GoldenCross, ConditionType::DeathCross] {
                self.confirm(store, symbol, condition_type, prev, today, alerts)?;
            }
        }

        if self.config.purge_expired {
            let cutoff = self.window_start(snapshots[last].date);
            let removed = store.purge_expired(Some(symbol), cutoff)?;
            if removed > 0 {
                info!(symbol, removed, %cutoff, "purged expired conditions");
            }
        }
        Ok(())
    }

    fn record_primary<S>(
        &self,
        store: &mut S,
        symbol: &str,
        condition_type: ConditionType,
        date: NaiveDate,
    ) -> Result<(), StoreError>
    where
        S: PrimaryConditionStore + ?Sized,
    {
        if self.config.dedupe_primary {
            let already_stored = store
                .list(Some(symbol))?
                .iter()
                .any(|c| c.condition_type == condition_type && c.occurrence_date == date);
            if already_stored {
                debug!(symbol, %condition_type, %date, "cross already pending");
                return Ok(());
            }
        }
        let condition = store.save(symbol, condition_type, date)?;
        debug!(symbol, id = %condition.id, %condition_type, %date, "saved pending condition");
        Ok(())
    }

    fn confirm<S>(
        &self,
        store: &mut S,
        symbol: &str,
        condition_type: ConditionType,
        prev: Option<&IndicatorSnapshot>,
        today: &IndicatorSnapshot,
        alerts: &mut Vec<Alert>,
    ) -> Result<(), StoreError>
    where
        S: PrimaryConditionStore + ?Sized,
    {
        let mut pending =
            store.find_active(symbol, condition_type, self.window_start(today.date))?;
        if pending.is_empty() {
            return Ok(());
        }
        pending.sort_by_key(|c| (c.occurrence_date, c.id));

        let signal = SignalType::from(condition_type);
        let score = scoring::score(signal, prev, today, &self.config);
        trace!(
            symbol,
            date = %today.date,
            %signal,
            rsi = score.rsi,
            macd = score.macd,
            bollinger = score.bollinger,
            total = score.total,
            pending = pending.len(),
            "confirmation score"
        );
        if !score.confirms(&self.config) {
            return Ok(());
        }

        for condition in pending {
            store.delete(&condition)?;
            let alert = build_alert(&condition, signal, today, &score);
            info!(
                symbol,
                %signal,
                date = %alert.date,
                cross_date = %condition.occurrence_date,
                score = alert.score,
                "signal confirmed"
            );
            alerts.push(alert);
        }
        Ok(())
    }
}

fn build_alert(
    condition: &PendingCondition,
    signal: SignalType,
    today: &IndicatorSnapshot,
    score: &ConfirmationScore,
) -> Alert {
    let band = match signal {
        SignalType::Entry => today.bollinger_upper,
        SignalType::Exit => today.bollinger_lower,
    };
    Alert {
        signal_type: signal,
        symbol: condition.symbol.clone(),
        date: today.date,
        short_ma: today.short_ma,
        long_ma: today.long_ma,
        rsi: today.rsi,
        macd: today.macd,
        macd_signal: today.macd_signal,
        band,
        score: score.total,
        reasoning: score.reasoning(signal),
    }
}
