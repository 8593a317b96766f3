//! Liquidity point — the validated, immutable leaf record every later stage reads.
//!
//! Points are only ever produced by [`create_point`]. Fields are private and
//! exposed through getters, and deserialization routes through the same
//! factory, so an unvalidated `Point` cannot exist.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DirectionBias, PointId, PointKind, PriceRange, Timeframe, Timestamp};

/// Raw construction input as emitted by an upstream detector.
///
/// Vocabulary fields are plain strings here; [`create_point`] parses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInput {
    pub id: String,
    pub kind: String,
    pub timeframe: String,
    pub price_range: PriceRange,
    pub direction_bias: String,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    #[serde(default)]
    pub mitigated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation_timestamp: Option<Timestamp>,
}

/// Which point invariant a construction input violated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    #[error("point id must not be empty")]
    EmptyId,

    #[error("unrecognized point kind '{0}'")]
    UnknownKind(String),

    #[error("unrecognized timeframe '{0}'")]
    UnknownTimeframe(String),

    #[error("unrecognized direction bias '{0}'")]
    UnknownDirectionBias(String),

    #[error("price range bounds must be finite (low={low}, high={high})")]
    NonFinitePrice { low: f64, high: f64 },

    #[error("price range bounds must be non-negative (low={low}, high={high})")]
    NegativePrice { low: f64, high: f64 },

    #[error("price range low {low} exceeds high {high}")]
    InvertedPriceRange { low: f64, high: f64 },

    #[error("valid_until {valid_until} must be after valid_from {valid_from}")]
    InvalidValidityWindow {
        valid_from: Timestamp,
        valid_until: Timestamp,
    },

    #[error("mitigated point requires a mitigation_timestamp")]
    MissingMitigationTimestamp,

    #[error("mitigation_timestamp supplied for a point that is not mitigated")]
    UnexpectedMitigationTimestamp,
}

/// A validated liquidity zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointInput", into = "PointInput")]
pub struct Point {
    id: PointId,
    kind: PointKind,
    timeframe: Timeframe,
    price_range: PriceRange,
    direction_bias: DirectionBias,
    valid_from: Timestamp,
    valid_until: Timestamp,
    mitigated: bool,
    mitigation_timestamp: Option<Timestamp>,
}

impl Point {
    pub fn id(&self) -> &PointId {
        &self.id
    }

    pub fn kind(&self) -> PointKind {
        self.kind
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn price_range(&self) -> PriceRange {
        self.price_range
    }

    pub fn direction_bias(&self) -> DirectionBias {
        self.direction_bias
    }

    pub fn valid_from(&self) -> Timestamp {
        self.valid_from
    }

    pub fn valid_until(&self) -> Timestamp {
        self.valid_until
    }

    pub fn is_mitigated(&self) -> bool {
        self.mitigated
    }

    pub fn mitigation_timestamp(&self) -> Option<Timestamp> {
        self.mitigation_timestamp
    }

    /// Re-check the structural invariants without trusting construction.
    pub fn is_internally_valid(&self) -> bool {
        !self.id.0.is_empty()
            && self.price_range.is_well_formed()
            && self.valid_until > self.valid_from
            && self.mitigated == self.mitigation_timestamp.is_some()
    }
}

/// Validate `input` and build an independent `Point`.
///
/// The returned point owns copies of every field; later changes to `input`
/// are never observed through it.
pub fn create_point(input: &PointInput) -> Result<Point, PointError> {
    if input.id.is_empty() {
        return Err(PointError::EmptyId);
    }

    let kind = input
        .kind
        .parse::<PointKind>()
        .map_err(|e| PointError::UnknownKind(e.value))?;
    let timeframe = input
        .timeframe
        .parse::<Timeframe>()
        .map_err(|e| PointError::UnknownTimeframe(e.value))?;
    let direction_bias = input
        .direction_bias
        .parse::<DirectionBias>()
        .map_err(|e| PointError::UnknownDirectionBias(e.value))?;

    validate_price_range(&input.price_range)?;

    if input.valid_until <= input.valid_from {
        return Err(PointError::InvalidValidityWindow {
            valid_from: input.valid_from,
            valid_until: input.valid_until,
        });
    }

    match (input.mitigated, input.mitigation_timestamp) {
        (true, None) => return Err(PointError::MissingMitigationTimestamp),
        (false, Some(_)) => return Err(PointError::UnexpectedMitigationTimestamp),
        _ => {}
    }

    Ok(Point {
        id: PointId::new(input.id.clone()),
        kind,
        timeframe,
        price_range: input.price_range,
        direction_bias,
        valid_from: input.valid_from,
        valid_until: input.valid_until,
        mitigated: input.mitigated,
        mitigation_timestamp: input.mitigation_timestamp,
    })
}

fn validate_price_range(range: &PriceRange) -> Result<(), PointError> {
    let PriceRange { low, high } = *range;
    if !low.is_finite() || !high.is_finite() {
        return Err(PointError::NonFinitePrice { low, high });
    }
    if low < 0.0 || high < 0.0 {
        return Err(PointError::NegativePrice { low, high });
    }
    if low > high {
        return Err(PointError::InvertedPriceRange { low, high });
    }
    Ok(())
}

/// True iff the point is internally valid and not yet mitigated.
pub fn is_eligible_for_entry(point: &Point) -> bool {
    point.is_internally_valid() && !point.mitigated
}

impl TryFrom<PointInput> for Point {
    type Error = PointError;

    fn try_from(input: PointInput) -> Result<Self, Self::Error> {
        create_point(&input)
    }
}

impl From<Point> for PointInput {
    fn from(point: Point) -> Self {
        PointInput {
            id: point.id.0,
            kind: point.kind.as_str().to_string(),
            timeframe: point.timeframe.as_str().to_string(),
            price_range: point.price_range,
            direction_bias: point.direction_bias.as_str().to_string(),
            valid_from: point.valid_from,
            valid_until: point.valid_until,
            mitigated: point.mitigated,
            mitigation_timestamp: point.mitigation_timestamp,
        }
    }
}
