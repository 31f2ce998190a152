//! Look-ahead contamination tests for every indicator and the snapshot engine.
//!
//! No reading at day t may depend on price data from day t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..150) and the full series
//! (bars 0..300). Days 0..150 must be identical between both runs.

use chrono::NaiveDate;
use crosswatch_core::components::indicator::Indicator;
use crosswatch_core::config::IndicatorPeriods;
use crosswatch_core::domain::PriceBar;
use crosswatch_core::engine::{IndicatorEngine, StandardIndicatorEngine};
use crosswatch_core::indicators::*;

/// Deterministic pseudo-random walk.
fn make_test_bars(n: usize) -> Vec<PriceBar> {
    let base_date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let change = ((seed >> 33) % 200) as f64 * 0.05 - 5.0;
            price = (price + change).max(10.0);
            let open = price - 0.4;
            let close = price + 0.2;
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.5,
                low: open.min(close) - 1.5,
                close,
                volume: 10_000 + i as u64 * 10,
            }
        })
        .collect()
}

fn same(t: f64, f: f64) -> bool {
    (t.is_nan() && f.is_nan()) || (t - f).abs() < 1e-10
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[PriceBar], truncated_len: usize) {
    let full = indicator.compute(full_bars);
    let truncated = indicator.compute(&full_bars[..truncated_len]);

    assert_eq!(truncated.len(), truncated_len, "{}: length", indicator.name());
    assert_eq!(full.len(), full_bars.len(), "{}: length", indicator.name());

    for i in 0..truncated_len {
        assert!(
            same(truncated[i], full[i]),
            "{}: look-ahead at day {i}: truncated={}, full={}",
            indicator.name(),
            truncated[i],
            full[i]
        );
    }
}

#[test]
fn lookahead_sma() {
    let bars = make_test_bars(300);
    assert_no_lookahead(&Sma::new(50), &bars, 150);
    assert_no_lookahead(&Sma::new(200), &bars, 250);
}

#[test]
fn lookahead_ema() {
    let bars = make_test_bars(300);
    assert_no_lookahead(&Ema::new(12), &bars, 150);
    assert_no_lookahead(&Ema::new(26), &bars, 150);
}

#[test]
fn lookahead_rsi() {
    let bars = make_test_bars(300);
    assert_no_lookahead(&Rsi::new(14), &bars, 150);
    assert_no_lookahead(&Rsi::new(5), &bars, 150);
}

#[test]
fn lookahead_macd() {
    let bars = make_test_bars(300);
    assert_no_lookahead(&Macd::line(12, 26, 9), &bars, 150);
    assert_no_lookahead(&Macd::signal(12, 26, 9), &bars, 150);
}

#[test]
fn lookahead_bollinger() {
    let bars = make_test_bars(300);
    assert_no_lookahead(&Bollinger::upper(20, 2.0), &bars, 150);
    assert_no_lookahead(&Bollinger::middle(20, 2.0), &bars, 150);
    assert_no_lookahead(&Bollinger::lower(20, 2.0), &bars, 150);
}

#[test]
fn lookahead_snapshots() {
    let bars = make_test_bars(300);
    let engine = StandardIndicatorEngine::new(IndicatorPeriods::default());
    let full = engine.snapshots(&bars);
    let truncated = engine.snapshots(&bars[..250]);

    for (i, (t, f)) in truncated.iter().zip(&full).enumerate() {
        assert_eq!(t.date, f.date);
        let pairs = [
            (t.short_ma, f.short_ma),
            (t.long_ma, f.long_ma),
            (t.rsi, f.rsi),
            (t.macd, f.macd),
            (t.macd_signal, f.macd_signal),
            (t.bollinger_upper, f.bollinger_upper),
            (t.bollinger_lower, f.bollinger_lower),
        ];
        assert!(pairs.iter().all(|(a, b)| same(*a, *b)), "snapshot {i} differs");
    }
    assert!(truncated[249].is_defined());
}
