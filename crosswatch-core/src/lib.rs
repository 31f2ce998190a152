//! Crosswatch Core: trend-cross signal confirmation.
//!
//! A golden or death cross of two moving averages is recorded as a pending
//! condition. Over the following days it is scored against RSI, MACD and
//! Bollinger readings; a strong enough score turns it into an entry or exit
//! alert, and conditions that never confirm expire with the time window.
//!
//! - Domain types (price bars, pending conditions, alerts)
//! - Indicator trait and implementations (SMA, EMA, RSI, MACD, Bollinger)
//! - Pending condition store trait with in-memory and JSONL backends
//! - Confirmation engine and weighted scoring
//! - TOML configuration and CSV price loading

pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod store;

pub use config::CrosswatchConfig;
pub use engine::{AnalyzeError, SignalConfirmationEngine};
