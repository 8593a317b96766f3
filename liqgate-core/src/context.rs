//! Context derivation — what a point means at one evaluation instant.
//!
//! A context is recomputed on demand from a point snapshot and an explicit
//! `evaluated_at`. It never reads the clock and never fails.

use serde::{Deserialize, Serialize};

use crate::domain::{ContextId, DirectionBias, PointId, Timeframe, Timestamp};
use crate::point::Point;

/// Status of a point at the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextStatus {
    Active,
    Expired,
    Mitigated,
    /// Evaluated before the point's validity window opened.
    Invalid,
}

/// How the point's bias relates to an optional higher-timeframe point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HtfRelation {
    Aligned,
    Counter,
    Neutral,
    /// No higher-timeframe point was supplied.
    Undefined,
}

/// Read-only interpretation of one point at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub point_id: PointId,
    pub timeframe: Timeframe,
    pub status: ContextStatus,
    pub within_validity_window: bool,
    pub htf_relation: HtfRelation,
    pub evaluated_at: Timestamp,
}

impl Context {
    pub fn id(&self) -> ContextId {
        ContextId::derive(&self.point_id, self.evaluated_at)
    }

    /// Active, and the higher timeframe does not oppose it.
    pub fn is_tradable(&self) -> bool {
        self.status == ContextStatus::Active
            && matches!(self.htf_relation, HtfRelation::Aligned | HtfRelation::Neutral)
    }
}

/// Derive the context of `point` at `evaluated_at`, optionally against `htf_point`.
///
/// Status precedence: before the window → `Invalid`; after it → `Expired`;
/// mitigated → `Mitigated`; otherwise `Active`. Both window edges are inclusive.
/// The HTF relation depends only on the two biases, not on status.
pub fn derive_context(
    point: &Point,
    evaluated_at: Timestamp,
    htf_point: Option<&Point>,
) -> Context {
    let within_validity_window =
        point.valid_from() <= evaluated_at && evaluated_at <= point.valid_until();

    let status = if evaluated_at < point.valid_from() {
        ContextStatus::Invalid
    } else if evaluated_at > point.valid_until() {
        ContextStatus::Expired
    } else if point.is_mitigated() {
        ContextStatus::Mitigated
    } else {
        ContextStatus::Active
    };

    let htf_relation = match htf_point {
        None => HtfRelation::Undefined,
        Some(htf) => relate_biases(point.direction_bias(), htf.direction_bias()),
    };

    Context {
        point_id: point.id().clone(),
        timeframe: point.timeframe(),
        status,
        within_validity_window,
        htf_relation,
        evaluated_at,
    }
}

fn relate_biases(ltf: DirectionBias, htf: DirectionBias) -> HtfRelation {
    match (ltf, htf) {
        (DirectionBias::Neutral, _) | (_, DirectionBias::Neutral) => HtfRelation::Neutral,
        (DirectionBias::Bullish, DirectionBias::Bullish)
        | (DirectionBias::Bearish, DirectionBias::Bearish) => HtfRelation::Aligned,
        (DirectionBias::Bullish, DirectionBias::Bearish)
        | (DirectionBias::Bearish, DirectionBias::Bullish) => HtfRelation::Counter,
    }
}
