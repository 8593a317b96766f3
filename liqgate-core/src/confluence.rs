//! Confluence scoring — quality of a valid scenario's optional evidence.
//!
//! Weights are strategy policy and always come from the caller. There is no
//! built-in weight table and `ConfluenceWeights` has no `Default`.
//!
//! - `max_possible_score` sums the five positive factor weights only.
//! - `raw_score` sums the weights of every present factor, dampener included.
//! - `normalized_score` is `raw / max * 100` clamped to `[0, 100]`, or 0 when
//!   `max <= 0`. `confidence` is always equal to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ScenarioId, Timestamp};
use crate::scenario::{OptionalEvidence, Scenario, ScenarioStatus};

/// One optional-evidence factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceFactor {
    OrderBlock,
    FairValueGap,
    BreakerBlock,
    DiscountPremium,
    BuySellLiquidity,
    NewsRisk,
}

impl ConfluenceFactor {
    pub const ALL: [ConfluenceFactor; 6] = [
        ConfluenceFactor::OrderBlock,
        ConfluenceFactor::FairValueGap,
        ConfluenceFactor::BreakerBlock,
        ConfluenceFactor::DiscountPremium,
        ConfluenceFactor::BuySellLiquidity,
        ConfluenceFactor::NewsRisk,
    ];

    /// Dampeners reduce the score but never count toward the maximum.
    pub fn is_dampener(&self) -> bool {
        matches!(self, ConfluenceFactor::NewsRisk)
    }

    /// Whether `evidence` reports this factor as present.
    pub fn is_present_in(&self, evidence: &OptionalEvidence) -> bool {
        let flag = match self {
            ConfluenceFactor::OrderBlock => evidence.order_block,
            ConfluenceFactor::FairValueGap => evidence.fair_value_gap,
            ConfluenceFactor::BreakerBlock => evidence.breaker_block,
            ConfluenceFactor::DiscountPremium => evidence.discount_premium,
            ConfluenceFactor::BuySellLiquidity => evidence.buy_sell_liquidity,
            ConfluenceFactor::NewsRisk => evidence.news_risk,
        };
        flag.unwrap_or(false)
    }
}

/// Caller-supplied weight per factor. `news_risk` is usually negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfluenceWeights {
    pub order_block: f64,
    pub fair_value_gap: f64,
    pub breaker_block: f64,
    pub discount_premium: f64,
    pub buy_sell_liquidity: f64,
    pub news_risk: f64,
}

impl ConfluenceWeights {
    pub fn weight(&self, factor: ConfluenceFactor) -> f64 {
        match factor {
            ConfluenceFactor::OrderBlock => self.order_block,
            ConfluenceFactor::FairValueGap => self.fair_value_gap,
            ConfluenceFactor::BreakerBlock => self.breaker_block,
            ConfluenceFactor::DiscountPremium => self.discount_premium,
            ConfluenceFactor::BuySellLiquidity => self.buy_sell_liquidity,
            ConfluenceFactor::NewsRisk => self.news_risk,
        }
    }

    /// Sum of the positive-factor weights; dampeners are excluded.
    pub fn max_possible_score(&self) -> f64 {
        ConfluenceFactor::ALL
            .iter()
            .filter(|f| !f.is_dampener())
            .map(|f| self.weight(*f))
            .sum()
    }
}

/// A dampener that fired, with its signed effect on the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DampenerImpact {
    pub factor: ConfluenceFactor,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub present: Vec<ConfluenceFactor>,
    pub missing: Vec<ConfluenceFactor>,
    /// Every factor, 0 for absent ones.
    pub contributions: BTreeMap<ConfluenceFactor, f64>,
    pub dampeners_applied: Vec<DampenerImpact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceScore {
    pub scenario_id: ScenarioId,
    pub raw_score: f64,
    pub max_possible_score: f64,
    pub normalized_score: f64,
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
    pub evaluated_at: Timestamp,
}

/// Why a scenario was not scored. Serialized with a `code` tag
/// (`SCENARIO_NOT_VALID`) so audit readers can match on it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreError {
    #[error("SCENARIO_NOT_VALID: scenario {scenario_id} is {status}")]
    ScenarioNotValid {
        scenario_id: ScenarioId,
        status: ScenarioStatus,
    },
}

/// Score a valid scenario's optional evidence against `weights`.
pub fn score_confluence(
    scenario: &Scenario,
    weights: &ConfluenceWeights,
    evaluated_at: Timestamp,
) -> Result<ConfluenceScore, ScoreError> {
    if scenario.status != ScenarioStatus::Valid {
        return Err(ScoreError::ScenarioNotValid {
            scenario_id: scenario.id.clone(),
            status: scenario.status,
        });
    }

    let evidence = &scenario.optional_evidence;
    let mut present = Vec::new();
    let mut missing = Vec::new();
    let mut contributions = BTreeMap::new();
    let mut dampeners_applied = Vec::new();
    let mut raw_score = 0.0;

    for factor in ConfluenceFactor::ALL {
        if factor.is_present_in(evidence) {
            let weight = weights.weight(factor);
            raw_score += weight;
            contributions.insert(factor, weight);
            present.push(factor);
            if factor.is_dampener() {
                dampeners_applied.push(DampenerImpact { factor, impact: weight });
            }
        } else {
            contributions.insert(factor, 0.0);
            missing.push(factor);
        }
    }

    let max_possible_score = weights.max_possible_score();
    let normalized_score = normalize(raw_score, max_possible_score);

    Ok(ConfluenceScore {
        scenario_id: scenario.id.clone(),
        raw_score,
        max_possible_score,
        normalized_score,
        confidence: normalized_score,
        breakdown: ScoreBreakdown {
            present,
            missing,
            contributions,
            dampeners_applied,
        },
        evaluated_at,
    })
}

fn normalize(raw: f64, max_possible: f64) -> f64 {
    if max_possible.is_nan() || max_possible <= 0.0 {
        return 0.0;
    }
    let pct = raw / max_possible * 100.0;
    // NaN from non-finite weights collapses to the floor.
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContextId;
    use crate::scenario::{RequiredGates, TemplateKind};
    use chrono::{TimeZone, Utc};

    fn t(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn weights() -> ConfluenceWeights {
        ConfluenceWeights {
            order_block: 20.0,
            fair_value_gap: 15.0,
            breaker_block: 25.0,
            discount_premium: 15.0,
            buy_sell_liquidity: 25.0,
            news_risk: -20.0,
        }
    }

    fn scenario(status: ScenarioStatus, evidence: OptionalEvidence) -> Scenario {
        Scenario {
            id: ScenarioId("sc-1".into()),
            template_kind: TemplateKind::SweepReversal,
            context_id: ContextId("ob-1@0".into()),
            status,
            required_gates: RequiredGates {
                htf_bias_aligned: true,
                liquidity_event: true,
                structural_confirmation: true,
            },
            optional_evidence: evidence,
            evaluated_at: t(0),
            invalidation_reason: None,
        }
    }

    fn all_positive(news_risk: bool) -> OptionalEvidence {
        OptionalEvidence {
            order_block: Some(true),
            fair_value_gap: Some(true),
            breaker_block: Some(true),
            discount_premium: Some(true),
            buy_sell_liquidity: Some(true),
            news_risk: Some(news_risk),
        }
    }

    #[test]
    fn full_evidence_scores_one_hundred() {
        let valid = scenario(ScenarioStatus::Valid, all_positive(false));
        let score = score_confluence(&valid, &weights(), t(5)).unwrap();
        assert_eq!(score.raw_score, 100.0);
        assert_eq!(score.normalized_score, 100.0);
        assert_eq!(score.confidence, score.normalized_score);
        assert!(score.breakdown.dampeners_applied.is_empty());
        assert_eq!(score.breakdown.missing, vec![ConfluenceFactor::NewsRisk]);
        assert_eq!(score.evaluated_at, t(5));
    }

    #[test]
    fn news_risk_dampens_to_eighty() {
        let valid = scenario(ScenarioStatus::Valid, all_positive(true));
        let score = score_confluence(&valid, &weights(), t(5)).unwrap();
        assert_eq!(score.raw_score, 80.0);
        assert_eq!(score.normalized_score, 80.0);
        assert_eq!(score.max_possible_score, 100.0);
        assert_eq!(
            score.breakdown.dampeners_applied,
            vec![DampenerImpact { factor: ConfluenceFactor::NewsRisk, impact: -20.0 }]
        );
        assert_eq!(score.breakdown.present.len(), 6);
        assert!(score.breakdown.missing.is_empty());
    }

    #[test]
    fn breakdown_lists_every_factor() {
        let evidence = OptionalEvidence {
            fair_value_gap: Some(true),
            breaker_block: Some(false),
            ..OptionalEvidence::default()
        };
        let valid = scenario(ScenarioStatus::Valid, evidence);
        let score = score_confluence(&valid, &weights(), t(5)).unwrap();
        assert_eq!(score.breakdown.contributions.len(), 6);
        assert_eq!(score.breakdown.contributions[&ConfluenceFactor::FairValueGap], 15.0);
        assert_eq!(score.breakdown.contributions[&ConfluenceFactor::BreakerBlock], 0.0);
        assert_eq!(score.breakdown.present, vec![ConfluenceFactor::FairValueGap]);
        assert_eq!(score.breakdown.missing.len(), 5);
        assert_eq!(score.normalized_score, 15.0);
    }

    #[test]
    fn only_dampener_clamps_to_zero() {
        let evidence = OptionalEvidence { news_risk: Some(true), ..OptionalEvidence::default() };
        let valid = scenario(ScenarioStatus::Valid, evidence);
        let score = score_confluence(&valid, &weights(), t(5)).unwrap();
        assert_eq!(score.raw_score, -20.0);
        assert_eq!(score.normalized_score, 0.0);
    }

    #[test]
    fn non_positive_max_yields_zero() {
        let zero = ConfluenceWeights {
            order_block: 0.0,
            fair_value_gap: 0.0,
            breaker_block: 0.0,
            discount_premium: 0.0,
            buy_sell_liquidity: 0.0,
            news_risk: 50.0,
        };
        let valid = scenario(ScenarioStatus::Valid, all_positive(true));
        let score = score_confluence(&valid, &zero, t(5)).unwrap();
        assert_eq!(score.max_possible_score, 0.0);
        assert_eq!(score.normalized_score, 0.0);
    }

    #[test]
    fn large_dampener_is_not_in_max() {
        let mut w = weights();
        w.news_risk = -1.0e9;
        assert_eq!(w.max_possible_score(), 100.0);
    }

    #[test]
    fn rejects_non_valid_scenarios() {
        for status in [ScenarioStatus::Forming, ScenarioStatus::Invalidated] {
            let err = score_confluence(&scenario(status, all_positive(false)), &weights(), t(5))
                .unwrap_err();
            assert_eq!(
                err,
                ScoreError::ScenarioNotValid { scenario_id: ScenarioId("sc-1".into()), status }
            );
        }
    }

    #[test]
    fn score_error_carries_its_code_on_the_wire() {
        let err = ScoreError::ScenarioNotValid {
            scenario_id: ScenarioId("sc-1".into()),
            status: ScenarioStatus::Forming,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "SCENARIO_NOT_VALID");
        assert_eq!(json["scenario_id"], "sc-1");
        assert_eq!(json["status"], "forming");
        assert_eq!(serde_json::from_value::<ScoreError>(json).unwrap(), err);
        assert_eq!(err.to_string(), "SCENARIO_NOT_VALID: scenario sc-1 is forming");
    }

    #[test]
    fn weights_reject_unknown_factor() {
        let json = r#"{"order_block":20.0,"fair_value_gap":15.0,"breaker_block":25.0,
            "discount_premium":15.0,"buy_sell_liquidity":25.0,"news_risk":-20.0,
            "liquidity_sweep":40.0}"#;
        assert!(serde_json::from_str::<ConfluenceWeights>(json).is_err());
    }

    #[test]
    fn contributions_serialize_with_snake_case_keys() {
        let valid = scenario(ScenarioStatus::Valid, all_positive(true));
        let score = score_confluence(&valid, &weights(), t(5)).unwrap();
        let json = serde_json::to_value(&score.breakdown).unwrap();
        assert_eq!(json["contributions"]["news_risk"], -20.0);
        assert_eq!(json["contributions"]["buy_sell_liquidity"], 25.0);
    }
}
