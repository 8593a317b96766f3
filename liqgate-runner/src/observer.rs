//! Stage observers — fire-and-forget hooks around the pipeline.
//!
//! An observer sees every stage output as it is produced but cannot influence
//! it: `on_stage` returns nothing and the pipeline never reads observer state.
//! Records are identical with [`NoopObserver`] and [`TracingObserver`].

use tracing::{debug, info};

use liqgate_core::{
    ConfluenceScore, Context, DecisionResult, RiskContract, Scenario, ScoreError,
};

/// One stage output, borrowed from the evaluation in flight.
#[derive(Debug, Clone, Copy)]
pub enum StageEvent<'a> {
    ContextDerived {
        signal_id: &'a str,
        context: &'a Context,
    },
    ScenarioBuilt {
        signal_id: &'a str,
        scenario: &'a Scenario,
    },
    /// The context was not tradable and the scenario was invalidated.
    ScenarioInvalidated {
        signal_id: &'a str,
        scenario: &'a Scenario,
    },
    ConfluenceScored {
        signal_id: &'a str,
        score: &'a ConfluenceScore,
    },
    ScoringSkipped {
        signal_id: &'a str,
        error: &'a ScoreError,
    },
    RiskBuilt {
        signal_id: &'a str,
        contract: &'a RiskContract,
    },
    DecisionMade {
        signal_id: &'a str,
        decision: &'a DecisionResult,
        actionable: bool,
    },
}

/// Receives stage events. Must be shareable across batch worker threads.
pub trait PipelineObserver: Send + Sync {
    fn on_stage(&self, event: &StageEvent<'_>);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_stage(&self, _event: &StageEvent<'_>) {}
}

/// Observer that reports stages through `tracing`.
///
/// Intermediate stages log at `debug`, final decisions at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, event: &StageEvent<'_>) {
        match *event {
            StageEvent::ContextDerived { signal_id, context } => debug!(
                signal_id,
                context_id = %context.id(),
                status = ?context.status,
                htf_relation = ?context.htf_relation,
                tradable = context.is_tradable(),
                "context derived"
            ),
            StageEvent::ScenarioBuilt { signal_id, scenario } => debug!(
                signal_id,
                scenario_id = %scenario.id,
                template = %scenario.template_kind,
                status = %scenario.status,
                "scenario built"
            ),
            StageEvent::ScenarioInvalidated { signal_id, scenario } => debug!(
                signal_id,
                scenario_id = %scenario.id,
                reason = ?scenario.invalidation_reason,
                "scenario invalidated"
            ),
            StageEvent::ConfluenceScored { signal_id, score } => debug!(
                signal_id,
                raw = score.raw_score,
                normalized = score.normalized_score,
                present = score.breakdown.present.len(),
                "confluence scored"
            ),
            StageEvent::ScoringSkipped { signal_id, error } => {
                debug!(signal_id, %error, "confluence not scored")
            }
            StageEvent::RiskBuilt { signal_id, contract } => debug!(
                signal_id,
                status = %contract.status,
                rr = ?contract.rr,
                reason = ?contract.invalidation_reason,
                targets = contract.take_profits.len(),
                "risk contract built"
            ),
            StageEvent::DecisionMade {
                signal_id,
                decision,
                actionable,
            } => info!(
                signal_id,
                action = %decision.action,
                reason = %decision.reason,
                actionable,
                "decision"
            ),
        }
    }
}
