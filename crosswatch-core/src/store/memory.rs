//! In-memory condition store.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::{is_active, is_expired, PrimaryConditionStore, StoreError};
use crate::domain::{ConditionId, ConditionType, PendingCondition};

/// Condition store backed by an ordered map. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Default)]
pub struct MemoryConditionStore {
    conditions: BTreeMap<ConditionId, PendingCondition>,
    next_id: u64,
}

impl MemoryConditionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously persisted conditions.
    ///
    /// New ids continue after the largest id seen.
    pub fn from_conditions(conditions: impl IntoIterator<Item = PendingCondition>) -> Self {
        let conditions: BTreeMap<_, _> = conditions.into_iter().map(|c| (c.id, c)).collect();
        let next_id = conditions.keys().next_back().map_or(0, |id| id.0);
        Self {
            conditions,
            next_id,
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn contains(&self, id: ConditionId) -> bool {
        self.conditions.contains_key(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PendingCondition> {
        self.conditions.values()
    }
}

impl PrimaryConditionStore for MemoryConditionStore {
    fn save(
        &mut self,
        symbol: &str,
        condition_type: ConditionType,
        occurrence_date: NaiveDate,
    ) -> Result<PendingCondition, StoreError> {
        self.next_id += 1;
        let condition = PendingCondition {
            id: ConditionId(self.next_id),
            symbol: symbol.to_string(),
            condition_type,
            occurrence_date,
        };
        self.conditions.insert(condition.id, condition.clone());
        Ok(condition)
    }

    fn find_active(
        &self,
        symbol: &str,
        condition_type: ConditionType,
        after: NaiveDate,
    ) -> Result<Vec<PendingCondition>, StoreError> {
        Ok(self
            .conditions
            .values()
            .filter(|c| is_active(c, symbol, condition_type, after))
            .cloned()
            .collect())
    }

    fn delete(&mut self, condition: &PendingCondition) -> Result<(), StoreError> {
        self.conditions.remove(&condition.id);
        Ok(())
    }

    fn list(&self, symbol: Option<&str>) -> Result<Vec<PendingCondition>, StoreError> {
        Ok(self
            .conditions
            .values()
            .filter(|c| symbol.map_or(true, |s| c.symbol == s))
            .cloned()
            .collect())
    }

    fn purge_expired(
        &mut self,
        symbol: Option<&str>,
        cutoff: NaiveDate,
    ) -> Result<usize, StoreError> {
        let before = self.conditions.len();
        self.conditions.retain(|_, c| !is_expired(c, symbol, cutoff));
        Ok(before - self.conditions.len())
    }
}
