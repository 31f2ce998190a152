//! Domain types for crosswatch

pub mod alert;
pub mod bar;
pub mod condition;
pub mod ids;

pub use alert::{Alert, SignalType};
pub use bar::{validate_series, PriceBar, SeriesError};
pub use condition::{ConditionType, PendingCondition};
pub use ids::ConditionId;
