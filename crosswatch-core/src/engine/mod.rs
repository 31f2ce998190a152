//! Signal confirmation: primary cross detection, secondary scoring, alert emission.

pub mod confirmation;
pub mod scoring;
pub mod snapshot;

pub use confirmation::SignalConfirmationEngine;
pub use scoring::{entry_score, exit_score, ConfirmationScore};
pub use snapshot::{IndicatorEngine, IndicatorSnapshot, StandardIndicatorEngine};

use thiserror::Error;

use crate::domain::{Alert, SeriesError};
use crate::store::StoreError;

/// Errors that abort an analysis run.
///
/// Store mutations already applied stay applied. A condition confirmed before
/// a store failure is already deleted, so its alert is carried in `Store`.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("condition store failed ({} alert(s) confirmed before the failure): {source}", .alerts.len())]
    Store {
        #[source]
        source: StoreError,
        alerts: Vec<Alert>,
    },

    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),
}

impl AnalyzeError {
    /// Alerts confirmed before the run failed. Empty for series errors.
    pub fn alerts(&self) -> &[Alert] {
        match self {
            AnalyzeError::Store { alerts, .. } => alerts,
            AnalyzeError::Series(_) => &[],
        }
    }

    pub fn into_alerts(self) -> Vec<Alert> {
        match self {
            AnalyzeError::Store { alerts, .. } => alerts,
            AnalyzeError::Series(_) => Vec::new(),
        }
    }
}
