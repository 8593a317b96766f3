//! Domain vocabulary shared by every stage.

pub mod ids;
pub mod market;

pub use ids::{ContextId, PointId, ScenarioId};
pub use market::{DirectionBias, PointKind, PriceRange, Timeframe, TradeDirection, UnknownLabel};

/// Evaluation instants are always caller-supplied UTC timestamps.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
