//! Risk validation — structural stop-loss / take-profit selection and R:R.
//!
//! Works purely on referenced points and their price ranges. No execution
//! prices, no sizing. Always returns a contract; failures are flagged with a
//! named reason instead of being raised.
//!
//! Steps short-circuit in order:
//! 1. scenario must be valid (`SCENARIO_NOT_VALID`)
//! 2. a structurally placed stop anchor must exist (`NO_VALID_STOP`)
//! 3. at least one target on the profit side must exist (`NO_VALID_TARGETS`)
//! 4. R:R from TP1 only must reach [`MIN_RISK_REWARD`] (`RR_TOO_LOW`)

use serde::{Deserialize, Serialize};

use crate::confluence::ConfluenceScore;
use crate::domain::market::labelled_enum;
use crate::domain::{PointId, PointKind, ScenarioId, Timestamp, TradeDirection};
use crate::point::Point;
use crate::scenario::Scenario;

/// Minimum reward-to-risk ratio for a valid contract.
pub const MIN_RISK_REWARD: f64 = 3.0;

/// Maximum number of take-profit slots.
pub const MAX_TAKE_PROFITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopLossKind {
    Structure,
    OrderBlock,
}

impl StopLossKind {
    fn for_point(kind: PointKind) -> Self {
        match kind {
            PointKind::OrderBlock => StopLossKind::OrderBlock,
            _ => StopLossKind::Structure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLoss {
    pub kind: StopLossKind,
    pub reference_point_id: PointId,
    /// Placeholder: always true once a stop is accepted. No boundary check yet.
    pub beyond_structure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetLevel {
    #[serde(rename = "TP1")]
    Tp1,
    #[serde(rename = "TP2")]
    Tp2,
    #[serde(rename = "TP3")]
    Tp3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetProbability {
    High,
    Medium,
    Low,
}

/// Fixed slot table: nearest target first.
const TARGET_SLOTS: [(TargetLevel, TargetProbability); MAX_TAKE_PROFITS] = [
    (TargetLevel::Tp1, TargetProbability::High),
    (TargetLevel::Tp2, TargetProbability::Medium),
    (TargetLevel::Tp3, TargetProbability::Low),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfit {
    pub level: TargetLevel,
    pub target_point_id: PointId,
    pub probability: TargetProbability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskStatus {
    Valid,
    Invalid,
}

labelled_enum!(RiskStatus, "risk status", {
    Valid => "valid",
    Invalid => "invalid",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskInvalidation {
    ScenarioNotValid,
    NoValidStop,
    NoValidTargets,
    RrTooLow,
}

impl std::fmt::Display for RiskInvalidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskInvalidation::ScenarioNotValid => write!(f, "SCENARIO_NOT_VALID"),
            RiskInvalidation::NoValidStop => write!(f, "NO_VALID_STOP"),
            RiskInvalidation::NoValidTargets => write!(f, "NO_VALID_TARGETS"),
            RiskInvalidation::RrTooLow => write!(f, "RR_TOO_LOW"),
        }
    }
}

/// Candidate points for one scenario, already filtered upstream.
///
/// Stop candidates are in priority order: the first qualifying one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCandidates {
    pub entry: Point,
    pub direction: TradeDirection,
    #[serde(default)]
    pub stop_loss_candidates: Vec<Point>,
    #[serde(default)]
    pub take_profit_candidates: Vec<Point>,
}

/// Structural stop/target specification with its reward-to-risk ratio.
///
/// Early failures (steps 1-3) carry no stop, targets, or ratio. An `RR_TOO_LOW`
/// contract keeps everything it computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContract {
    pub scenario_id: ScenarioId,
    pub stop_loss: Option<StopLoss>,
    pub take_profits: Vec<TakeProfit>,
    pub rr: Option<f64>,
    pub status: RiskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalidation_reason: Option<RiskInvalidation>,
    /// Confluence confidence at build time, copied for audit. Never used in selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub evaluated_at: Timestamp,
}

impl RiskContract {
    pub fn is_valid(&self) -> bool {
        self.status == RiskStatus::Valid
    }

    fn rejected(
        scenario: &Scenario,
        reason: RiskInvalidation,
        confidence: Option<f64>,
        evaluated_at: Timestamp,
    ) -> Self {
        Self {
            scenario_id: scenario.id.clone(),
            stop_loss: None,
            take_profits: Vec::new(),
            rr: None,
            status: RiskStatus::Invalid,
            invalidation_reason: Some(reason),
            confidence,
            evaluated_at,
        }
    }
}

/// Select and validate a stop/target structure for `scenario`.
pub fn build_risk_contract(
    scenario: &Scenario,
    score: Option<&ConfluenceScore>,
    candidates: &RiskCandidates,
    evaluated_at: Timestamp,
) -> RiskContract {
    let confidence = score.map(|s| s.confidence);

    if !scenario.is_valid() {
        return RiskContract::rejected(
            scenario,
            RiskInvalidation::ScenarioNotValid,
            confidence,
            evaluated_at,
        );
    }

    let entry = &candidates.entry;
    let direction = candidates.direction;

    let Some(stop_point) = select_stop(entry, direction, &candidates.stop_loss_candidates) else {
        return RiskContract::rejected(
            scenario,
            RiskInvalidation::NoValidStop,
            confidence,
            evaluated_at,
        );
    };

    let targets = select_targets(entry, direction, &candidates.take_profit_candidates);
    let Some(tp1) = targets.first() else {
        return RiskContract::rejected(
            scenario,
            RiskInvalidation::NoValidTargets,
            confidence,
            evaluated_at,
        );
    };

    let rr = risk_reward(entry, stop_point, tp1, direction);

    let stop_loss = StopLoss {
        kind: StopLossKind::for_point(stop_point.kind()),
        reference_point_id: stop_point.id().clone(),
        beyond_structure: true,
    };
    let take_profits = targets
        .iter()
        .zip(TARGET_SLOTS)
        .map(|(point, (level, probability))| TakeProfit {
            level,
            target_point_id: point.id().clone(),
            probability,
        })
        .collect();

    let (status, invalidation_reason) = if rr < MIN_RISK_REWARD {
        (RiskStatus::Invalid, Some(RiskInvalidation::RrTooLow))
    } else {
        (RiskStatus::Valid, None)
    };

    RiskContract {
        scenario_id: scenario.id.clone(),
        stop_loss: Some(stop_loss),
        take_profits,
        rr: Some(rr),
        status,
        invalidation_reason,
        confidence,
        evaluated_at,
    }
}

/// First stop anchor that sits fully on the loss side of entry.
fn select_stop<'a>(
    entry: &Point,
    direction: TradeDirection,
    candidates: &'a [Point],
) -> Option<&'a Point> {
    let entry_range = entry.price_range();
    candidates.iter().find(|p| {
        p.kind().is_stop_anchor()
            && match direction {
                TradeDirection::Bullish => p.price_range().is_entirely_below(&entry_range),
                TradeDirection::Bearish => p.price_range().is_entirely_above(&entry_range),
            }
    })
}

/// Up to three targets on the profit side, nearest first. Ties keep caller order.
fn select_targets<'a>(
    entry: &Point,
    direction: TradeDirection,
    candidates: &'a [Point],
) -> Vec<&'a Point> {
    let entry_range = entry.price_range();
    let mut eligible: Vec<(f64, &Point)> = candidates
        .iter()
        .filter_map(|p| {
            let range = p.price_range();
            match direction {
                TradeDirection::Bullish if range.is_entirely_above(&entry_range) => {
                    Some((range.low - entry_range.high, p))
                }
                TradeDirection::Bearish if range.is_entirely_below(&entry_range) => {
                    Some((entry_range.low - range.high, p))
                }
                _ => None,
            }
        })
        .collect();

    eligible.sort_by(|a, b| a.0.total_cmp(&b.0));
    eligible.into_iter().take(MAX_TAKE_PROFITS).map(|(_, p)| p).collect()
}

/// Reward over risk from range boundaries, TP1 only.
fn risk_reward(entry: &Point, stop: &Point, tp1: &Point, direction: TradeDirection) -> f64 {
    let e = entry.price_range();
    let s = stop.price_range();
    let t = tp1.price_range();
    let (risk, reward) = match direction {
        TradeDirection::Bullish => (e.low - s.high, t.low - e.high),
        TradeDirection::Bearish => (s.low - e.high, e.low - t.high),
    };
    if risk > 0.0 {
        reward / risk
    } else {
        0.0
    }
}
