//! Pending primary conditions: trend crosses awaiting confirmation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ConditionId;

/// Which moving-average cross was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    /// Short MA crossed above long MA.
    GoldenCross,
    /// Short MA crossed below long MA.
    DeathCross,
}

impl ConditionType {
    /// Label used in alert reasoning.
    pub fn label(&self) -> &'static str {
        match self {
            ConditionType::GoldenCross => "Golden Cross",
            ConditionType::DeathCross => "Death Cross",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionType::GoldenCross => write!(f, "GOLDEN_CROSS"),
            ConditionType::DeathCross => write!(f, "DEATH_CROSS"),
        }
    }
}

/// A primary cross recorded in the store, waiting for secondary confirmation.
///
/// Write-once: a condition is created by the store and later deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCondition {
    pub id: ConditionId,
    pub symbol: String,
    pub condition_type: ConditionType,
    pub occurrence_date: NaiveDate,
}

impl PendingCondition {
    /// Whole days elapsed between the cross and `date`.
    pub fn age_days(&self, date: NaiveDate) -> i64 {
        (date - self.occurrence_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&ConditionType::GoldenCross).unwrap();
        assert_eq!(json, "\"GOLDEN_CROSS\"");
        let back: ConditionType = serde_json::from_str("\"DEATH_CROSS\"").unwrap();
        assert_eq!(back, ConditionType::DeathCross);
    }

    #[test]
    fn unknown_condition_type_rejected() {
        assert!(serde_json::from_str::<ConditionType>("\"SIDEWAYS\"").is_err());
    }

    #[test]
    fn age_in_days() {
        let condition = PendingCondition {
            id: ConditionId(1),
            symbol: "TEST".into(),
            condition_type: ConditionType::GoldenCross,
            occurrence_date: NaiveDate::from_ymd_opt(2023, 10, 6).unwrap(),
        };
        let later = NaiveDate::from_ymd_opt(2023, 10, 17).unwrap();
        assert_eq!(condition.age_days(later), 11);
    }
}
