use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identity of a pending condition.
///
/// Opaque to callers: only the store that issued it gives it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub u64);

impl From<u64> for ConditionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
