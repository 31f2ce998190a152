//! Primary condition store: where pending trend crosses wait for confirmation.
//!
//! The confirmation engine only talks to the `PrimaryConditionStore` trait;
//! the backing technology is the caller's choice. Conditions are write-once,
//! delete-once: there is no update operation.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlConditionStore;
pub use memory::MemoryConditionStore;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{ConditionType, PendingCondition};

/// Errors from a condition store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt store record at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}

/// Persistence boundary for pending primary conditions.
pub trait PrimaryConditionStore {
    /// Record a new pending condition and assign it a fresh id.
    fn save(
        &mut self,
        symbol: &str,
        condition_type: ConditionType,
        occurrence_date: NaiveDate,
    ) -> Result<PendingCondition, StoreError>;

    /// Conditions for (symbol, type) that occurred strictly after `after`.
    ///
    /// Order is unspecified.
    fn find_active(
        &self,
        symbol: &str,
        condition_type: ConditionType,
        after: NaiveDate,
    ) -> Result<Vec<PendingCondition>, StoreError>;

    /// Remove a condition by id. Deleting an absent condition is a no-op.
    fn delete(&mut self, condition: &PendingCondition) -> Result<(), StoreError>;

    /// Every stored condition, optionally restricted to one symbol, ordered by id.
    fn list(&self, symbol: Option<&str>) -> Result<Vec<PendingCondition>, StoreError>;

    /// Delete conditions that occurred on or before `cutoff`.
    ///
    /// Returns the number removed.
    fn purge_expired(
        &mut self,
        symbol: Option<&str>,
        cutoff: NaiveDate,
    ) -> Result<usize, StoreError>;
}

/// Shared query predicate for `find_active`.
pub(crate) fn is_active(
    condition: &PendingCondition,
    symbol: &str,
    condition_type: ConditionType,
    after: NaiveDate,
) -> bool {
    condition.symbol == symbol
        && condition.condition_type == condition_type
        && condition.occurrence_date > after
}

/// Shared predicate for `purge_expired`.
pub(crate) fn is_expired(
    condition: &PendingCondition,
    symbol: Option<&str>,
    cutoff: NaiveDate,
) -> bool {
    symbol.map_or(true, |s| condition.symbol == s) && condition.occurrence_date <= cutoff
}
