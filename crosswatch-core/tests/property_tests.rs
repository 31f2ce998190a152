//! Property tests for confirmation invariants.
//!
//! Uses proptest to verify:
//! 1. Every alert consumes a condition that was in the store
//! 2. Every cross inside the scan window is recorded exactly once
//! 3. No condition confirms once it is `time_window_days` old
//! 4. The weighted score is monotonic in the fired conditions

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::HashSet;

use crosswatch_core::config::ConfirmationConfig;
use crosswatch_core::domain::{ConditionType, PendingCondition, PriceBar};
use crosswatch_core::engine::confirmation::detect_cross;
use crosswatch_core::engine::{
    ConfirmationScore, IndicatorEngine, IndicatorSnapshot, SignalConfirmationEngine,
};
use crosswatch_core::store::{MemoryConditionStore, PrimaryConditionStore, StoreError};

// ── Fixtures ─────────────────────────────────────────────────────────

struct Replay(Vec<IndicatorSnapshot>);

impl IndicatorEngine for Replay {
    fn snapshots(&self, _bars: &[PriceBar]) -> Vec<IndicatorSnapshot> {
        self.0.clone()
    }
}

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + Duration::days(i as i64)
}

fn bars_for(snaps: &[IndicatorSnapshot]) -> Vec<PriceBar> {
    snaps
        .iter()
        .map(|s| PriceBar {
            date: s.date,
            open: s.close,
            high: s.close + 1.0,
            low: s.close - 1.0,
            close: s.close,
            volume: 1000,
        })
        .collect()
}

/// Records every save and delete passing through to the inner store.
#[derive(Default)]
struct AuditStore {
    inner: MemoryConditionStore,
    saved: Vec<PendingCondition>,
    deleted: Vec<PendingCondition>,
    deletes_of_absent: usize,
}

impl PrimaryConditionStore for AuditStore {
    fn save(
        &mut self,
        symbol: &str,
        condition_type: ConditionType,
        date: NaiveDate,
    ) -> Result<PendingCondition, StoreError> {
        let condition = self.inner.save(symbol, condition_type, date)?;
        self.saved.push(condition.clone());
        Ok(condition)
    }

    fn find_active(
        &self,
        symbol: &str,
        condition_type: ConditionType,
        after: NaiveDate,
    ) -> Result<Vec<PendingCondition>, StoreError> {
        self.inner.find_active(symbol, condition_type, after)
    }

    fn delete(&mut self, condition: &PendingCondition) -> Result<(), StoreError> {
        if !self.inner.contains(condition.id) {
            self.deletes_of_absent += 1;
        }
        self.deleted.push(condition.clone());
        self.inner.delete(condition)
    }

    fn list(&self, symbol: Option<&str>) -> Result<Vec<PendingCondition>, StoreError> {
        self.inner.list(symbol)
    }

    fn purge_expired(
        &mut self,
        symbol: Option<&str>,
        cutoff: NaiveDate,
    ) -> Result<usize, StoreError> {
        self.inner.purge_expired(symbol, cutoff)
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// (short_ma, rsi, macd, macd_signal, close) with long MA fixed at 100 and bands at 95/105.
fn arb_day() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (
        98.0..102.0_f64,
        0.0..100.0_f64,
        -1.0..1.0_f64,
        -1.0..1.0_f64,
        92.0..108.0_f64,
    )
}

fn arb_series() -> impl Strategy<Value = Vec<IndicatorSnapshot>> {
    prop::collection::vec(arb_day(), 2..40).prop_map(|days| {
        days.into_iter()
            .enumerate()
            .map(|(i, (short_ma, rsi, macd, macd_signal, close))| IndicatorSnapshot {
                date: day(i),
                close,
                short_ma,
                long_ma: 100.0,
                rsi,
                macd,
                macd_signal,
                bollinger_upper: 105.0,
                bollinger_middle: 100.0,
                bollinger_lower: 95.0,
            })
            .collect()
    })
}

fn arb_weight() -> impl Strategy<Value = f64> {
    (0.0..1.0_f64).prop_map(|w| (w * 100.0).round() / 100.0)
}

fn no_purge() -> ConfirmationConfig {
    ConfirmationConfig {
        purge_expired: false,
        ..ConfirmationConfig::default()
    }
}

// ── 1. Alerts consume stored conditions ──────────────────────────────

proptest! {
    #[test]
    fn every_alert_deletes_a_stored_condition(snaps in arb_series()) {
        let bars = bars_for(&snaps);
        let engine = SignalConfirmationEngine::new(no_purge(), Replay(snaps));
        let mut store = AuditStore::default();

        let alerts = engine.analyze(&mut store, &bars, "TEST").unwrap();

        prop_assert_eq!(alerts.len(), store.deleted.len());
        prop_assert_eq!(store.deletes_of_absent, 0);
        for (alert, condition) in alerts.iter().zip(&store.deleted) {
            prop_assert!(!store.inner.contains(condition.id));
            prop_assert_eq!(alert.signal_type.primary(), condition.condition_type);
            prop_assert!(alert.score >= engine.config().threshold);
        }
    }
}

// ── 2. Crosses in the scan window are recorded once ──────────────────

proptest! {
    #[test]
    fn every_cross_in_window_is_saved_once(snaps in arb_series()) {
        let window = no_purge().time_window_days as usize;
        let last = snaps.len() - 1;
        let start = last.saturating_sub(window);
        let expected: HashSet<(ConditionType, NaiveDate)> = (start..=last)
            .filter_map(|i| {
                let prev = i.checked_sub(1).map(|p| &snaps[p]);
                detect_cross(prev, &snaps[i]).map(|t| (t, snaps[i].date))
            })
            .collect();

        let bars = bars_for(&snaps);
        let engine = SignalConfirmationEngine::new(no_purge(), Replay(snaps));
        let mut store = AuditStore::default();
        let alerts = engine.analyze(&mut store, &bars, "TEST").unwrap();

        let saved: HashSet<_> = store
            .saved
            .iter()
            .map(|c| (c.condition_type, c.occurrence_date))
            .collect();
        prop_assert_eq!(saved.len(), store.saved.len(), "no duplicate saves");
        prop_assert_eq!(&saved, &expected);
        prop_assert_eq!(store.inner.len() + alerts.len(), expected.len());
    }

    /// Running the same series twice never duplicates a pending cross.
    #[test]
    fn rerun_does_not_duplicate_pending(snaps in arb_series()) {
        let bars = bars_for(&snaps);
        let engine = SignalConfirmationEngine::new(no_purge(), Replay(snaps));
        let mut store = MemoryConditionStore::new();
        engine.analyze(&mut store, &bars, "TEST").unwrap();
        engine.analyze(&mut store, &bars, "TEST").unwrap();

        let pending = store.list(Some("TEST")).unwrap();
        let unique: HashSet<_> = pending
            .iter()
            .map(|c| (c.condition_type, c.occurrence_date))
            .collect();
        prop_assert_eq!(unique.len(), pending.len());
    }
}

// ── 3. Window bound ──────────────────────────────────────────────────

proptest! {
    /// A condition from day 0 is offered a perfect confirmation on day `offset`.
    #[test]
    fn no_confirmation_at_or_beyond_window(window in 1u32..15, offset in 1usize..30) {
        let config = ConfirmationConfig {
            time_window_days: window,
            ..no_purge()
        };
        let quiet = IndicatorSnapshot {
            date: day(offset - 1),
            close: 100.0,
            short_ma: 101.0,
            long_ma: 100.0,
            rsi: 50.0,
            macd: 0.0,
            macd_signal: 0.1,
            bollinger_upper: 105.0,
            bollinger_middle: 100.0,
            bollinger_lower: 95.0,
        };
        let perfect = IndicatorSnapshot {
            date: day(offset),
            close: 106.0,
            rsi: 20.0,
            macd: 0.5,
            ..quiet
        };
        let snaps = vec![quiet, perfect];
        let bars = bars_for(&snaps);

        let mut store = MemoryConditionStore::new();
        let condition = store.save("TEST", ConditionType::GoldenCross, day(0)).unwrap();
        let engine = SignalConfirmationEngine::new(config, Replay(snaps));
        let alerts = engine.analyze(&mut store, &bars, "TEST").unwrap();

        let within = offset < window as usize;
        prop_assert_eq!(alerts.len(), usize::from(within));
        prop_assert_eq!(store.contains(condition.id), !within);
        if let Some(alert) = alerts.first() {
            prop_assert!((alert.date - condition.occurrence_date).num_days() < i64::from(window));
        }
    }
}

// ── 4. Score monotonicity ────────────────────────────────────────────

proptest! {
    #[test]
    fn firing_more_conditions_never_lowers_score(
        rsi_weight in arb_weight(),
        macd_weight in arb_weight(),
        bollinger_weight in arb_weight(),
    ) {
        let config = ConfirmationConfig {
            rsi_weight,
            macd_weight,
            bollinger_weight,
            ..ConfirmationConfig::default()
        };
        for mask in 0u8..8 {
            let fired = [mask & 1 != 0, mask & 2 != 0, mask & 4 != 0];
            let base = ConfirmationScore::weigh(fired[0], fired[1], fired[2], &config);
            for flip in 0..3 {
                if fired[flip] {
                    continue;
                }
                let mut more = fired;
                more[flip] = true;
                let raised = ConfirmationScore::weigh(more[0], more[1], more[2], &config);
                prop_assert!(raised.total >= base.total);
                prop_assert_eq!(raised.fired_count(), base.fired_count() + 1);
            }
        }
    }
}

#[test]
fn default_weights_need_all_three() {
    let config = ConfirmationConfig::default();
    let confirming: Vec<u8> = (0u8..8)
        .filter(|mask| {
            ConfirmationScore::weigh(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, &config)
                .confirms(&config)
        })
        .collect();
    assert_eq!(confirming, vec![7]);
}
