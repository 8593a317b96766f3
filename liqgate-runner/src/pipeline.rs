//! Pipeline — wires the six stages together for one candidate signal.
//!
//! Order: points → context → scenario (invalidated if the context is not
//! tradable) → confluence → risk contract → decision. Only malformed point
//! input aborts an evaluation; every downstream outcome, including an
//! unscorable scenario or a rejected risk contract, is recorded.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use liqgate_core::{
    build_risk_contract, build_scenario, create_point, derive_context, derive_decision,
    invalidate_on_context_change, score_confluence, Action, ConfluenceScore, Context,
    DecisionResult, Point, PointError, PointInput, RiskCandidates, RiskContract, Scenario,
    ScoreError,
};

use crate::config::PipelineConfig;
use crate::observer::{PipelineObserver, StageEvent};
use crate::signal::SignalInput;

/// Which slot of a signal a point input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointRole {
    Entry,
    Htf,
    StopLoss,
    TakeProfit,
}

impl fmt::Display for PointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointRole::Entry => write!(f, "entry"),
            PointRole::Htf => write!(f, "htf"),
            PointRole::StopLoss => write!(f, "stop-loss candidate"),
            PointRole::TakeProfit => write!(f, "take-profit candidate"),
        }
    }
}

/// Errors that abort a single evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("signal '{signal_id}': {role} point #{index} rejected: {source}")]
    InvalidPoint {
        signal_id: String,
        role: PointRole,
        index: usize,
        #[source]
        source: PointError,
    },
}

/// Every stage output for one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub signal_id: String,
    pub context: Context,
    pub scenario: Scenario,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ConfluenceScore>,
    /// Why the scenario could not be scored, when it could not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_error: Option<ScoreError>,
    pub risk: RiskContract,
    pub decision: DecisionResult,
}

impl PipelineRecord {
    /// The guardrail allows entry and the risk structure holds.
    pub fn is_actionable(&self) -> bool {
        self.decision.action == Action::PrepareEntry && self.risk.is_valid()
    }
}

/// Run all six stages for `input`.
pub fn evaluate_signal(
    input: &SignalInput,
    config: &PipelineConfig,
    observer: &dyn PipelineObserver,
) -> Result<PipelineRecord, PipelineError> {
    let signal_id = input.signal_id.as_str();
    let at = input.evaluated_at;

    let entry = build_point(input, PointRole::Entry, 0, &input.entry)?;
    let htf = input
        .htf
        .as_ref()
        .map(|p| build_point(input, PointRole::Htf, 0, p))
        .transpose()?;
    let stop_loss_candidates =
        build_points(input, PointRole::StopLoss, &input.stop_loss_candidates)?;
    let take_profit_candidates =
        build_points(input, PointRole::TakeProfit, &input.take_profit_candidates)?;

    let context = derive_context(&entry, at, htf.as_ref());
    observer.on_stage(&StageEvent::ContextDerived {
        signal_id,
        context: &context,
    });

    let built = build_scenario(
        input.template,
        &context,
        &input.required_gates,
        &input.optional_evidence,
        at,
    );
    observer.on_stage(&StageEvent::ScenarioBuilt {
        signal_id,
        scenario: &built,
    });

    let check = invalidate_on_context_change(&built, &context);
    let scenario = if check.invalidated {
        let invalidated = built.apply_invalidation(&check);
        observer.on_stage(&StageEvent::ScenarioInvalidated {
            signal_id,
            scenario: &invalidated,
        });
        invalidated
    } else {
        built
    };

    let (score, score_error) = match score_confluence(&scenario, &config.weights, at) {
        Ok(score) => {
            observer.on_stage(&StageEvent::ConfluenceScored {
                signal_id,
                score: &score,
            });
            (Some(score), None)
        }
        Err(error) => {
            observer.on_stage(&StageEvent::ScoringSkipped {
                signal_id,
                error: &error,
            });
            (None, Some(error))
        }
    };

    let candidates = RiskCandidates {
        entry,
        direction: input.direction,
        stop_loss_candidates,
        take_profit_candidates,
    };
    let risk = build_risk_contract(&scenario, score.as_ref(), &candidates, at);
    observer.on_stage(&StageEvent::RiskBuilt {
        signal_id,
        contract: &risk,
    });

    let decision = derive_decision(&input.guardrail);

    let record = PipelineRecord {
        signal_id: input.signal_id.clone(),
        context,
        scenario,
        score,
        score_error,
        risk,
        decision,
    };
    observer.on_stage(&StageEvent::DecisionMade {
        signal_id,
        decision: &record.decision,
        actionable: record.is_actionable(),
    });

    Ok(record)
}

fn build_point(
    input: &SignalInput,
    role: PointRole,
    index: usize,
    raw: &PointInput,
) -> Result<Point, PipelineError> {
    create_point(raw).map_err(|source| PipelineError::InvalidPoint {
        signal_id: input.signal_id.clone(),
        role,
        index,
        source,
    })
}

fn build_points(
    input: &SignalInput,
    role: PointRole,
    raw: &[PointInput],
) -> Result<Vec<Point>, PipelineError> {
    raw.iter()
        .enumerate()
        .map(|(index, p)| build_point(input, role, index, p))
        .collect()
}
